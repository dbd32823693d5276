//! `stratus synth`: Compose the stack and emit its manifest.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use stratus_compose::manifest::ManifestFormat;
use stratus_compose::root::CompositionRoot;

use super::StackArgs;

/// Manifest serialization selectable on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

impl From<OutputFormat> for ManifestFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Json,
            OutputFormat::Yaml => Self::Yaml,
        }
    }
}

/// Arguments for the `synth` subcommand.
#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Manifest format; inferred from the output extension when omitted.
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the manifest to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Executes the `synth` command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be resolved, composition
/// fails, or the manifest cannot be written.
pub fn execute(stack: &StackArgs, args: SynthArgs) -> anyhow::Result<()> {
    let bundle = stack.bundle()?;
    let result = CompositionRoot::new(stack.settings()).compose(&bundle)?;
    let format = resolve_format(args.format, args.output.as_deref());

    if let Some(ref out_path) = args.output {
        result.manifest().write_to(out_path, format)?;
        println!(
            "Synthesized {} resource(s) -> {}",
            result.manifest().len(),
            out_path.display()
        );
        for diagnostic in result.diagnostics() {
            println!("  ! {diagnostic}");
        }
    } else {
        print!("{}", result.manifest().render(format)?);
    }

    Ok(())
}

/// Picks the manifest format: explicit flag, then output extension, then JSON.
fn resolve_format(explicit: Option<OutputFormat>, output: Option<&Path>) -> ManifestFormat {
    if let Some(format) = explicit {
        return format.into();
    }
    let is_yaml = output
        .and_then(Path::extension)
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if is_yaml {
        ManifestFormat::Yaml
    } else {
        ManifestFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_format_wins() {
        assert_eq!(
            resolve_format(Some(OutputFormat::Json), Some(Path::new("stack.yaml"))),
            ManifestFormat::Json
        );
    }

    #[test]
    fn format_inferred_from_extension() {
        assert_eq!(
            resolve_format(None, Some(Path::new("stack.YML"))),
            ManifestFormat::Yaml
        );
        assert_eq!(
            resolve_format(None, Some(Path::new("stack.json"))),
            ManifestFormat::Json
        );
        assert_eq!(resolve_format(None, None), ManifestFormat::Json);
    }

    #[test]
    fn empty_stack_name_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stack.json");
        let stack = StackArgs {
            stack_name: String::new(),
            admin_cidr: "0.0.0.0/0".into(),
            ..StackArgs::default()
        };
        let err = execute(
            &stack,
            SynthArgs {
                format: None,
                output: Some(path.clone()),
            },
        )
        .expect_err("should fail");
        assert!(err.to_string().contains("stack name"), "got: {err}");
        assert!(!path.exists());
    }

    #[test]
    fn synth_writes_manifest_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stack.json");
        let stack = StackArgs {
            stack_name: "Demo".into(),
            region: "eu-west-1".into(),
            account: "111122223333".into(),
            admin_cidr: "10.0.0.0/8".into(),
            domain_name: Some("example.com".into()),
            ..StackArgs::default()
        };
        execute(
            &stack,
            SynthArgs {
                format: None,
                output: Some(path.clone()),
            },
        )
        .expect("synth");

        let written = std::fs::read_to_string(&path).expect("read");
        let document: serde_json::Value = serde_json::from_str(&written).expect("json");
        assert!(document["Resources"]
            .as_object()
            .is_some_and(|r| !r.is_empty()));
        assert_eq!(
            document["Outputs"]["NameResolutionRecordName"]["Value"],
            "api.example.com."
        );
    }
}
