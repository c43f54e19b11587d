use crate::error::{Error, Result};

use super::commands::GenerateCommands;
use super::progress::create_progress_bar;
use crate::config::{CollectorConfig, MetadataConfig, ProvenanceConfig, RecipeConfig};
use crate::context::env::{vars_from_context_json, vars_from_process_env};
use crate::context::{CiVariables, TokenPolicy};
use crate::hash::DigestConfig;
use crate::in_toto::{Envelope, STATEMENT_TYPE_V01};
use crate::slsa::generators::parse_materials;
use crate::slsa::pipeline::Pipeline;
use crate::slsa::predicate::{Completeness, Item};
use crate::utils::safe_create_file;

use log::info;
use std::fs;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

pub fn handle_generate_command(cmd: GenerateCommands) -> Result<()> {
    match cmd {
        GenerateCommands::Files {
            artifact_path,
            output_path,
            github_context,
            runner_context,
            extra_materials,
            builder_id,
            recipe_type,
            entry_point,
            arguments,
            predicate_type,
            hash_alg,
            concurrency,
            reproducible,
            complete_arguments,
            complete_environment,
            complete_materials,
            include_token,
            no_source_material,
            encoding,
            print,
            progress,
        } => {
            let digest = DigestConfig::new(hash_alg.iter().map(|c| c.to_hash_algorithm()).collect())?;

            let concurrency = match concurrency {
                Some(n) => NonZeroUsize::new(n).ok_or_else(|| {
                    Error::Validation("concurrency must be at least 1".to_string())
                })?,
                None => crate::config::default_concurrency(),
            };

            let arguments: Option<serde_json::Value> = arguments
                .map(|json| serde_json::from_str(&json))
                .transpose()
                .map_err(|e| Error::Validation(format!("arguments are not valid JSON: {e}")))?;

            let config = ProvenanceConfig {
                statement_type: STATEMENT_TYPE_V01.to_string(),
                predicate_type,
                collector: CollectorConfig {
                    digest,
                    concurrency,
                },
                recipe: RecipeConfig {
                    builder_id,
                    recipe_type,
                    entry_point,
                    arguments,
                    token_policy: if include_token {
                        TokenPolicy::Include
                    } else {
                        TokenPolicy::Redact
                    },
                    include_source_material: !no_source_material,
                },
                metadata: MetadataConfig {
                    reproducible,
                    completeness: Completeness {
                        arguments: complete_arguments,
                        environment: complete_environment,
                        materials: complete_materials,
                    },
                },
                extra_materials: read_materials(&extra_materials)?,
            };

            let mut vars = match github_context {
                Some(github) => vars_from_context_json(&github, runner_context.as_deref())?,
                None => vars_from_process_env(),
            };

            let mut pipeline = Pipeline::new(config);
            if progress {
                pipeline = pipeline.with_progress(create_progress_bar(0));
            }

            let result = pipeline.generate_envelope(&artifact_path, &vars, chrono::Utc::now());
            wipe_token(&mut vars);
            let envelope = result?;

            let encoded = encode_envelope(&envelope, &encoding)?;
            write_output(&output_path, &encoded)?;
            info!("provenance written to {}", output_path.display());

            if print {
                println!("{encoded}");
            }

            Ok(())
        }
    }
}

/// Renders the envelope as pretty JSON or hex-encoded CBOR.
pub fn encode_envelope(envelope: &Envelope, encoding: &str) -> Result<String> {
    match encoding.to_lowercase().as_str() {
        "json" => envelope.to_json_pretty(),
        "cbor" => {
            let envelope_cbor =
                serde_cbor::to_vec(envelope).map_err(|e| Error::Serialization(e.to_string()))?;
            Ok(hex::encode(&envelope_cbor))
        }
        _ => Err(Error::Validation(format!(
            "Invalid output encoding '{encoding}'. Valid options are: json, cbor"
        ))),
    }
}

fn read_materials(paths: &[PathBuf]) -> Result<Vec<Item>> {
    let mut materials = Vec::new();
    for path in paths {
        let json = fs::read_to_string(path)?;
        materials.extend(parse_materials(&json)?);
    }
    Ok(materials)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file = safe_create_file(path, false)?;
    file.write_all(content.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

fn wipe_token(vars: &mut CiVariables) {
    if let Some(mut token) = vars.remove("token") {
        token.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::HashAlgorithmChoice;
    use tempfile::tempdir;

    #[test]
    fn test_encode_envelope_encodings() {
        let envelope = Envelope::new(b"{}".to_vec(), "application/vnd.in-toto+json".to_string());

        let json = encode_envelope(&envelope, "JSON").unwrap();
        assert!(json.contains("\"payloadType\""));

        let cbor = encode_envelope(&envelope, "cbor").unwrap();
        assert!(hex::decode(&cbor).is_ok());

        assert!(matches!(
            encode_envelope(&envelope, "yaml"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_read_materials_concatenates_files() -> Result<()> {
        let dir = tempdir()?;
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        fs::write(&first, r#"[{"uri": "a", "digest": {"sha256": "01"}}]"#)?;
        fs::write(&second, r#"[{"uri": "b", "digest": {"sha256": "02"}}]"#)?;

        let materials = read_materials(&[first, second])?;
        let uris: Vec<&str> = materials.iter().map(|m| m.uri.as_str()).collect();
        assert_eq!(uris, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn test_wipe_token() {
        let mut vars = CiVariables::new();
        vars.insert("token".to_string(), "secret".to_string());
        vars.insert("sha".to_string(), "abc".to_string());

        wipe_token(&mut vars);
        assert!(!vars.contains_key("token"));
        assert_eq!(vars["sha"], "abc");
    }

    #[test]
    fn test_generate_files_writes_envelope() -> Result<()> {
        let dir = tempdir()?;
        let artifact = dir.path().join("out.bin");
        fs::write(&artifact, b"artifact")?;
        let output = dir.path().join("attestations").join("provenance.json");

        let github = serde_json::json!({
            "repository": "org/repo",
            "ref": "refs/heads/main",
            "sha": "abc123",
            "run_id": "42",
            "job": "build",
            "workflow": "ci",
            "token": "ghs_should_not_leak"
        })
        .to_string();

        handle_generate_command(GenerateCommands::Files {
            artifact_path: artifact,
            output_path: output.clone(),
            github_context: Some(github),
            runner_context: None,
            extra_materials: vec![],
            builder_id: crate::config::GITHUB_HOSTED_BUILDER_ID.to_string(),
            recipe_type: crate::config::GITHUB_ACTIONS_RECIPE_TYPE.to_string(),
            entry_point: None,
            arguments: None,
            predicate_type: crate::slsa::PROVENANCE_PREDICATE_TYPE_V01.to_string(),
            hash_alg: vec![HashAlgorithmChoice::Sha256],
            concurrency: Some(2),
            reproducible: false,
            complete_arguments: false,
            complete_environment: false,
            complete_materials: false,
            include_token: false,
            no_source_material: false,
            encoding: "json".to_string(),
            print: false,
            progress: false,
        })?;

        let written = fs::read_to_string(&output)?;
        let envelope: Envelope = serde_json::from_str(&written)?;
        let statement = envelope.decode_statement()?;
        assert_eq!(statement.subject[0].name, "out.bin");
        assert!(!String::from_utf8_lossy(envelope.payload()).contains("ghs_should_not_leak"));
        Ok(())
    }
}
