use std::process::ExitCode;

use bpaf::Bpaf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use rosdep_patch_cli_common::CliGlobalOptions;

/// Add the newest release to every rosdep OS mapping that lacks it
#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
struct Cli {
    #[bpaf(external(rosdep_patch_cli_common::cli_global_options), hide_usage)]
    global: CliGlobalOptions,
    #[bpaf(external(rosdep_patch::patch_args))]
    args: rosdep_patch::PatchArgs,
}

fn init_tracing(global: &CliGlobalOptions) {
    let filter = tracing_subscriber::EnvFilter::try_from_env("ROSDEP_PATCH_LOG")
        .ok()
        .or_else(|| {
            global.log_level.as_tracing_level().map(|level| {
                tracing_subscriber::EnvFilter::default()
                    .add_directive(LevelFilter::from_level(level).into())
            })
        });
    let Some(filter) = filter else {
        return;
    };
    tracing_subscriber::registry()
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_indent_lines(true)
                .with_verbose_exit(true)
                .with_verbose_entry(true)
                .with_timer(tracing_tree::time::Uptime::default())
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = cli().run();
    init_tracing(&cli.global);

    match rosdep_patch::run(&cli.args) {
        Ok(result) => {
            if cli.global.verbose {
                for patch in &result.patches {
                    let package = patch.package.as_deref().unwrap_or("<unknown>");
                    println!("  {package} ({} -> {})", patch.source, patch.target);
                }
                if result.written {
                    eprintln!("wrote {}", result.path.display());
                }
            }
            let count = result.patches.len();
            let target = &result.target;
            if count == 0 {
                println!("No packages needed patching.");
                ExitCode::SUCCESS
            } else if cli.args.check {
                println!("{count} packages would be patched with '{target}'.");
                ExitCode::from(1)
            } else {
                println!("Successfully patched {count} packages with '{target}'.");
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() -> anyhow::Result<()> {
        let parsed = cli()
            .run_inner(&[])
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        assert!(parsed.args.file.is_none());
        assert!(parsed.args.os.is_none());
        assert!(parsed.args.target.is_none());
        assert!(!parsed.args.check);
        assert!(!parsed.global.verbose);
        Ok(())
    }

    #[test]
    fn cli_parses_all_options() -> anyhow::Result<()> {
        let parsed = cli()
            .run_inner(&[
                "-v",
                "--log-level",
                "debug",
                "--os",
                "debian",
                "--target",
                "trixie",
                "--check",
                "rosdep/base.yaml",
            ])
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        assert!(parsed.global.verbose);
        assert_eq!(
            parsed.global.log_level,
            rosdep_patch_cli_common::LogLevel::Debug
        );
        assert_eq!(parsed.args.os.as_deref(), Some("debian"));
        assert_eq!(parsed.args.target.as_deref(), Some("trixie"));
        assert!(parsed.args.check);
        assert_eq!(parsed.args.file.as_deref(), Some("rosdep/base.yaml"));
        Ok(())
    }

    #[test]
    fn cli_rejects_extra_positionals() {
        assert!(cli().run_inner(&["a.yaml", "b.yaml"]).is_err());
    }
}
