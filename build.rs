// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: descriptor or template files
fn files_arg(required: bool) -> Arg {
    Arg::new("files")
        .num_args(1..)
        .required(required)
        .value_name("FILE")
        .help("Descriptor files (YAML or JSON)")
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn build_cli() -> Command {
    Command::new("nfvkit")
        .version(env!("CARGO_PKG_VERSION"))
        .author("nfvkit Contributors")
        .about("NFV descriptor translation, onboarding, lint and cloud cleanup")
        .subcommand_required(true)
        .arg(Arg::new("config").long("config").value_name("PATH").global(true).help("Configuration file"))
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity"),
        )
        .subcommand(
            Command::new("lint")
                .about("Lint Python sources and check descriptors and TOSCA templates")
                .arg(Arg::new("compile").short('c').long("compile").action(ArgAction::SetTrue).help("Also byte-compile Python sources"))
                .arg(Arg::new("target").short('t').long("target").value_name("DIR").action(ArgAction::Append).help("Directory to scan recursively"))
                .arg(Arg::new("files").num_args(0..).value_name("FILE").help("Individual files to check"))
                .arg(Arg::new("max-line-length").long("max-line-length").value_name("N").help("Maximum line length"))
                .arg(Arg::new("linter").long("linter").value_name("CMD").help("External linter command"))
                .arg(flag("no-linter", "Skip the external linter"))
                .arg(Arg::new("exclude").long("exclude").value_name("GLOB").action(ArgAction::Append).help("Glob of paths to skip"))
                .arg(Arg::new("jobs").short('j').long("jobs").help("Worker threads")),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate NSD/VNFD documents")
                .arg(files_arg(true)),
        )
        .subcommand(
            Command::new("translate")
                .about("Translate between TOSCA templates and native descriptors")
                .subcommand_required(true)
                .subcommand(
                    Command::new("tosca-to-native")
                        .about("Translate a TOSCA template into NSD/VNFD descriptors")
                        .arg(Arg::new("template").required(true).help("TOSCA service template"))
                        .arg(Arg::new("output").short('o').long("output").default_value(".").help("Output directory"))
                        .arg(Arg::new("format").long("format").value_name("yaml|json").help("Output format"))
                        .arg(flag("archive", "Write one package archive per descriptor"))
                        .arg(flag("strict", "Fail on unsupported node types"))
                        .arg(Arg::new("input").short('i').long("input").value_name("NAME=VALUE").action(ArgAction::Append).help("Override a template input"))
                        .arg(flag("check", "Translate and validate without writing")),
                )
                .subcommand(
                    Command::new("native-to-tosca")
                        .about("Translate native descriptors into a TOSCA template")
                        .arg(files_arg(true))
                        .arg(Arg::new("output").short('o').long("output").help("Output file (default: stdout)")),
                ),
        )
        .subcommand(
            Command::new("package")
                .about("Build and inspect descriptor packages")
                .subcommand_required(true)
                .subcommand(
                    Command::new("build")
                        .about("Build a package archive from a descriptor")
                        .arg(Arg::new("descriptor").required(true).help("NSD or VNFD file"))
                        .arg(Arg::new("output").short('o').long("output").default_value(".").help("Output directory"))
                        .arg(Arg::new("image").long("image").action(ArgAction::Append).help("Image file to include")),
                )
                .subcommand(
                    Command::new("inspect")
                        .about("List a package and verify its checksums")
                        .arg(Arg::new("package").required(true).help("Package archive")),
                ),
        )
        .subcommand(
            Command::new("onboard")
                .about("Upload a descriptor or package to the orchestrator")
                .arg(Arg::new("file").required(true).help("Package (.tar.gz) or descriptor file"))
                .arg(Arg::new("url").long("url").value_name("URL").help("Upload server URL"))
                .arg(flag("update", "Replace an already onboarded descriptor"))
                .arg(flag("no-wait", "Return without waiting for the transaction"))
                .arg(flag("force", "Upload even if local validation fails")),
        )
        .subcommand(
            Command::new("cleanup")
                .about("Delete leftover resources from a cloud account")
                .arg(Arg::new("account").required(true).help("Account name from the config file"))
                .arg(Arg::new("name").short('n').long("name").value_name("REGEX").help("Only delete matching names"))
                .arg(flag("all", "Delete every resource when no --name is given").conflicts_with("name"))
                .arg(Arg::new("exclude").short('e').long("exclude").action(ArgAction::Append).help("Never delete this name or id"))
                .arg(Arg::new("kind").short('k').long("kind").action(ArgAction::Append).help("Resource kinds to consider"))
                .arg(flag("dry-run", "Print the plan without deleting anything")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("nfvkit.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
