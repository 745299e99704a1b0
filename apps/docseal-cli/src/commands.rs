//! One-shot subcommands.
//!
//! Each invocation is its own process with its own key pair, so `sign`
//! ships the public key next to the signature and `verify` imports it.

use anyhow::Context;
use docseal_core::{
    load_verifier, verify_files, FileSink, LoadedDocument, SignatureEngine, SignatureSink,
    VerificationResult,
};
use std::path::Path;

use crate::config::Config;
use crate::output::{self, Format};

/// Public key file name paired with a signature file name:
/// `signature.sig` -> `signature.pub.pem`
pub fn public_key_name(signature_name: &str) -> String {
    let stem = signature_name
        .strip_suffix(".sig")
        .unwrap_or(signature_name);
    format!("{}.pub.pem", stem)
}

/// Print the SHA-256 digest of a document
pub fn hash(config: &Config, document: &Path, format: Format) -> anyhow::Result<String> {
    config.picker.select(document)?;
    let loaded = LoadedDocument::read(document)?;
    Ok(output::document(&loaded.info(), format))
}

/// Sign a document and write both the signature and the public key
pub fn sign(
    config: &Config,
    sink: FileSink,
    document: &Path,
    signature_name: Option<&str>,
    public_key_name_override: Option<&str>,
    format: Format,
) -> anyhow::Result<String> {
    config.picker.select(document)?;

    let signature_name = signature_name
        .unwrap_or(config.engine.default_sink.as_str())
        .to_string();
    let key_name = public_key_name_override
        .map(str::to_string)
        .unwrap_or_else(|| public_key_name(&signature_name));

    let mut engine = SignatureEngine::new(config.engine.clone(), sink)
        .context("Failed to initialise signing keys")?;
    let document_info = engine.load(document)?;
    let signature_info = engine.sign()?;
    engine.persist(&signature_name)?;
    engine.persist_public_key(&key_name)?;

    let signature_path = engine.sink().locate(&signature_name);
    let key_path = engine.sink().locate(&key_name);

    Ok(match format {
        Format::Text => format!(
            "{}\n{}\nSignature saved as '{}'\nPublic key saved as '{}'",
            output::document(&document_info, format),
            output::signature(&signature_info, format),
            signature_path,
            key_path,
        ),
        Format::Json => serde_json::to_string_pretty(&serde_json::json!({
            "document": document_info,
            "signature": signature_info,
            "signature_file": signature_path,
            "public_key_file": key_path,
            "fingerprint": engine.fingerprint(),
        }))?,
    })
}

/// Verify a document against a stored signature and a shipped public key
pub fn verify(
    config: &Config,
    sink: &FileSink,
    document: &Path,
    signature_name: Option<&str>,
    public_key: &str,
    format: Format,
) -> anyhow::Result<(VerificationResult, String)> {
    config.picker.select(document)?;

    let signature_name = signature_name.unwrap_or(config.engine.default_sink.as_str());
    let verifier = load_verifier(sink, public_key)?;
    let result = verify_files(&verifier, document, sink, signature_name)?;

    Ok((result, output::verification(result, format)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docseal_core::EngineError;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_public_key_name() {
        assert_eq!(public_key_name("signature.sig"), "signature.pub.pem");
        assert_eq!(public_key_name("out/contract.sig"), "out/contract.pub.pem");
        assert_eq!(public_key_name("blob"), "blob.pub.pem");
    }

    #[test]
    fn test_hash_command() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("abc.pdf");
        fs::write(&doc, b"abc").unwrap();

        let text = hash(&Config::default(), &doc, Format::Text).unwrap();
        assert!(text.ends_with(
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        ));
    }

    #[test]
    fn test_hash_rejects_filtered_extension() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("notes.txt");
        fs::write(&doc, b"abc").unwrap();

        let err = hash(&Config::default(), &doc, Format::Text).unwrap_err();
        assert!(err.to_string().contains("not an accepted document type"));
    }

    #[test]
    fn test_sign_then_verify_across_processes() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("report.pdf");
        fs::write(&doc, b"%PDF-1.4 report").unwrap();
        let config = Config::default();

        let text = sign(
            &config,
            FileSink::new(dir.path()),
            &doc,
            None,
            None,
            Format::Text,
        )
        .unwrap();
        assert!(text.contains(&format!(
            "Signature saved as '{}'",
            dir.path().join("signature.sig").display()
        )));
        assert!(text.contains(&format!(
            "Public key saved as '{}'",
            dir.path().join("signature.pub.pem").display()
        )));
        assert!(dir.path().join("signature.sig").exists());
        assert!(dir.path().join("signature.pub.pem").exists());

        let sink = FileSink::new(dir.path());
        let (result, _) = verify(
            &config,
            &sink,
            &doc,
            None,
            "signature.pub.pem",
            Format::Text,
        )
        .unwrap();
        assert_eq!(result, VerificationResult::Valid);

        fs::write(&doc, b"%PDF-1.4 report, edited").unwrap();
        let (result, text) = verify(
            &config,
            &sink,
            &doc,
            None,
            "signature.pub.pem",
            Format::Text,
        )
        .unwrap();
        assert_eq!(result, VerificationResult::Invalid);
        assert!(text.starts_with("Invalid signature"));
    }

    #[test]
    fn test_verify_bad_public_key_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("report.pdf");
        fs::write(&doc, b"content").unwrap();
        let sink = FileSink::new(dir.path());
        sink.write("key.pem", b"not a key").unwrap();

        let err = verify(&Config::default(), &sink, &doc, None, "key.pem", Format::Text)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::KeyImport(_))
        ));
    }

    #[test]
    fn test_verify_missing_signature_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("report.pdf");
        fs::write(&doc, b"content").unwrap();
        let config = Config::default();

        sign(&config, FileSink::new(dir.path()), &doc, None, None, Format::Json).unwrap();
        fs::remove_file(dir.path().join("signature.sig")).unwrap();

        let sink = FileSink::new(dir.path());
        let err = verify(&config, &sink, &doc, None, "signature.pub.pem", Format::Text)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::Read { .. })
        ));
    }
}
