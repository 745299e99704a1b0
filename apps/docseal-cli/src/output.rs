//! Rendering of engine results for the terminal

use docseal_core::{DocumentInfo, EngineState, SignatureInfo, VerificationResult};
use serde::Serialize;

/// Output style chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

pub fn document(info: &DocumentInfo, format: Format) -> String {
    match format {
        Format::Text => format!(
            "Selected file: {}\nHash (SHA-256): {}",
            info.file_name(),
            info.digest_hex
        ),
        Format::Json => to_json(info),
    }
}

pub fn signature(info: &SignatureInfo, format: Format) -> String {
    match format {
        Format::Text => format!(
            "Signature generated ({} bytes): {}...",
            info.len, info.hex_prefix
        ),
        Format::Json => to_json(info),
    }
}

pub fn verification(result: VerificationResult, format: Format) -> String {
    match format {
        Format::Text => match result {
            VerificationResult::Valid => {
                "Valid signature: the file has not been altered.".to_string()
            }
            VerificationResult::Invalid => {
                "Invalid signature: the file was altered or signed with another key.".to_string()
            }
        },
        Format::Json => to_json(&serde_json::json!({ "result": result })),
    }
}

pub fn state(
    state: EngineState,
    document: Option<&DocumentInfo>,
    signature: Option<&SignatureInfo>,
    fingerprint: &str,
    format: Format,
) -> String {
    match format {
        Format::Text => {
            let mut lines = vec![
                format!("State: {}", state),
                format!("Key fingerprint: {}", fingerprint),
            ];
            match document {
                Some(info) => {
                    lines.push(format!("Selected file: {}", info.path.display()));
                    lines.push(format!("Hash (SHA-256): {}", info.digest_hex));
                }
                None => lines.push("No file selected".to_string()),
            }
            if let Some(info) = signature {
                lines.push(format!("Signature: {}...", info.hex_prefix));
                if let Some(sink) = &info.persisted_to {
                    lines.push(format!("Saved to: {}", sink));
                }
            }
            lines.join("\n")
        }
        Format::Json => to_json(&serde_json::json!({
            "state": state,
            "fingerprint": fingerprint,
            "document": document,
            "signature": signature,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docseal_core::LoadedDocument;
    use pretty_assertions::assert_eq;

    fn sample_document() -> DocumentInfo {
        LoadedDocument::from_bytes("/tmp/report.pdf", b"abc".to_vec()).info()
    }

    #[test]
    fn test_document_text() {
        assert_eq!(
            document(&sample_document(), Format::Text),
            "Selected file: report.pdf\n\
             Hash (SHA-256): ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_document_json() {
        let json: serde_json::Value =
            serde_json::from_str(&document(&sample_document(), Format::Json)).unwrap();
        assert_eq!(json["size"], 3);
        assert_eq!(json["path"], "/tmp/report.pdf");
    }

    #[test]
    fn test_verification_json() {
        let json: serde_json::Value = serde_json::from_str(&verification(
            VerificationResult::Invalid,
            Format::Json,
        ))
        .unwrap();
        assert_eq!(json["result"], "Invalid");
    }

    #[test]
    fn test_state_without_document() {
        let text = state(EngineState::NoDocument, None, None, "abcd", Format::Text);
        assert_eq!(
            text,
            "State: no document\nKey fingerprint: abcd\nNo file selected"
        );
    }
}
