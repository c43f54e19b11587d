use crate::config::{GITHUB_ACTIONS_RECIPE_TYPE, GITHUB_HOSTED_BUILDER_ID};
use crate::hash::HashAlgorithm;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HashAlgorithmChoice {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithmChoice {
    pub fn to_hash_algorithm(&self) -> HashAlgorithm {
        match self {
            HashAlgorithmChoice::Sha256 => HashAlgorithm::Sha256,
            HashAlgorithmChoice::Sha384 => HashAlgorithm::Sha384,
            HashAlgorithmChoice::Sha512 => HashAlgorithm::Sha512,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum GenerateCommands {
    /// Generate provenance for the file(s) or directory of build artifacts
    Files {
        /// The file or directory of artifacts to include in provenance
        #[arg(long = "artifact-path")]
        artifact_path: PathBuf,

        /// Where to write the provenance envelope
        #[arg(long = "output-path", default_value = "provenance.json")]
        output_path: PathBuf,

        /// The GitHub context as JSON (`${{ toJSON(github) }}`); read from GITHUB_* variables when omitted
        #[arg(long = "github-context")]
        github_context: Option<String>,

        /// The runner context as JSON (`${{ toJSON(runner) }}`)
        #[arg(long = "runner-context")]
        runner_context: Option<String>,

        /// JSON files holding additional materials (comma-separated)
        #[arg(long = "extra-materials", num_args = 1.., value_delimiter = ',')]
        extra_materials: Vec<PathBuf>,

        /// Builder identity URI
        #[arg(long = "builder-id", default_value = GITHUB_HOSTED_BUILDER_ID)]
        builder_id: String,

        /// Recipe type URI
        #[arg(long = "recipe-type", default_value = GITHUB_ACTIONS_RECIPE_TYPE)]
        recipe_type: String,

        /// Recipe entry point (default: the workflow name)
        #[arg(long = "entry-point")]
        entry_point: Option<String>,

        /// Recipe arguments as JSON (default: workflow_dispatch inputs)
        #[arg(long = "arguments")]
        arguments: Option<String>,

        /// Predicate type URI recorded in the statement
        #[arg(long = "predicate-type", default_value = crate::slsa::PROVENANCE_PREDICATE_TYPE_V01)]
        predicate_type: String,

        /// Hash algorithms to digest artifacts with (comma-separated)
        #[arg(long = "hash-alg", value_enum, value_delimiter = ',', default_value = "sha256")]
        hash_alg: Vec<HashAlgorithmChoice>,

        /// Maximum number of files digested concurrently
        #[arg(long = "concurrency")]
        concurrency: Option<usize>,

        /// Claim the build is reproducible
        #[arg(long = "reproducible")]
        reproducible: bool,

        /// Claim the recipe arguments are complete
        #[arg(long = "complete-arguments")]
        complete_arguments: bool,

        /// Claim the recipe environment is complete
        #[arg(long = "complete-environment")]
        complete_environment: bool,

        /// Claim the materials are complete
        #[arg(long = "complete-materials")]
        complete_materials: bool,

        /// Embed the CI token in the recipe environment (never for published provenance)
        #[arg(long = "include-token")]
        include_token: bool,

        /// Do not record the source checkout as a material
        #[arg(long = "no-source-material")]
        no_source_material: bool,

        /// Encoding (json or cbor)
        #[arg(long = "encoding", default_value = "json")]
        encoding: String,

        /// Also print the envelope to stdout
        #[arg(long = "print")]
        print: bool,

        /// Show a progress bar while digesting
        #[arg(long = "progress")]
        progress: bool,
    },
}
