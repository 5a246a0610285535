//! Source-built interpreter install
//!
//! Four chained command steps: build dependencies, source download and
//! unpack, configure and compile, altinstall. `altinstall` keeps the
//! distribution's own interpreter untouched.

use crate::application::command_step::CommandStep;
use crate::application::ProvisionGraph;
use crate::config::InterpreterConfig;
use crate::domain::services::NodeId;
use crate::domain::value_objects::RemoteCommand;
use crate::error::{HostsmithError, HostsmithResult};

/// Packages required to compile the interpreter from source
const BUILD_SYSTEM_PACKAGES: &[&str] = &[
    "build-essential",
    "libssl-dev",
    "zlib1g-dev",
    "libbz2-dev",
    "libreadline-dev",
    "libsqlite3-dev",
    "wget",
    "curl",
    "llvm",
    "libncurses5-dev",
    "libncursesw5-dev",
    "xz-utils",
    "tk-dev",
    "libffi-dev",
    "liblzma-dev",
    "python3-openssl",
    "git",
];

/// Binary name the installed interpreter will have, e.g. "python3.12"
pub fn interpreter_name(version: &str) -> HostsmithResult<String> {
    let mut parts = version.split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) if !major.is_empty() && !minor.is_empty() => {
            Ok(format!("python{}.{}", major, minor))
        }
        _ => Err(HostsmithError::InvalidConfig {
            message: format!("interpreter version '{}' is not of the form major.minor.patch", version),
        }),
    }
}

/// Register the interpreter install chain; returns the final node
pub fn register(graph: &mut ProvisionGraph, cfg: &InterpreterConfig) -> HostsmithResult<NodeId> {
    // Validate the version shape up front so a typo fails before apply.
    interpreter_name(&cfg.version)?;
    let version = &cfg.version;

    let mut build_system = RemoteCommand::new("apt-get").arg("update").arg("-y").and_then(
        RemoteCommand::new("apt-get")
            .arg("install")
            .arg("--no-install-recommends")
            .arg("-y"),
    );
    for package in BUILD_SYSTEM_PACKAGES {
        build_system = build_system.arg(*package);
    }
    let build_system = graph.add_node(
        "interpreter-build-system",
        Box::new(CommandStep::new("interpreter-build-system", build_system)) as _,
    );

    let archive = format!("Python-{}.tgz", version);
    let sources = RemoteCommand::new("wget")
        .value(format!(
            "https://www.python.org/ftp/python/{}/{}",
            version, archive
        ))
        .and_then(RemoteCommand::new("tar").arg("-xf").value(&archive))
        .and_then(RemoteCommand::new("rm").arg("-f").value(&archive));
    let sources = graph.add_node(
        "interpreter-sources",
        Box::new(CommandStep::new("interpreter-sources", sources)) as _,
    );
    graph.depends(sources, build_system);

    let source_dir = format!("Python-{}", version);
    let build = RemoteCommand::new("cd")
        .value(&source_dir)
        .and_then(RemoteCommand::new("./configure").arg("--enable-optimizations"))
        .and_then(RemoteCommand::new("make").arg("-j").arg("2"));
    let build = graph.add_node(
        "interpreter-build",
        Box::new(CommandStep::new("interpreter-build", build)) as _,
    );
    graph.depends(build, sources);

    let install = RemoteCommand::new("cd")
        .value(&source_dir)
        .and_then(RemoteCommand::new("make").arg("altinstall"));
    let install = graph.add_node(
        "interpreter-install",
        Box::new(CommandStep::new("interpreter-install", install)) as _,
    );
    graph.depends(install, build);

    Ok(install)
}
