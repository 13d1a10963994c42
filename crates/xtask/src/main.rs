use std::collections::HashMap;

use anyhow::Context;
use serde::Deserialize;

/// Workspace crates each crate may depend on.
const ALLOWED_INTERNAL_DEPS: &[(&str, &[&str])] = &[
    ("minebot-domain", &[]),
    ("minebot-protocol", &[]),
    ("minebot-engine", &["minebot-domain", "minebot-protocol"]),
    ("xtask", &[]),
];

/// External crates forbidden in the pure layers.
const FORBIDDEN_IN_PURE_CRATES: &[&str] = &[
    "tokio",
    "axum",
    "reqwest",
    "tokio-tungstenite",
    "async-trait",
];

#[derive(Deserialize)]
struct Metadata {
    packages: Vec<Package>,
}

#[derive(Deserialize)]
struct Package {
    name: String,
    dependencies: Vec<Dependency>,
}

#[derive(Deserialize)]
struct Dependency {
    name: String,
    kind: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("arch-check") => arch_check(),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}"),
        None => anyhow::bail!("Usage: cargo xtask <command>\n\nCommands:\n  arch-check"),
    }
}

fn arch_check() -> anyhow::Result<()> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--format-version", "1", "--no-deps"])
        .output()
        .context("running cargo metadata")?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed")
    }

    let metadata: Metadata =
        serde_json::from_slice(&output.stdout).context("parsing cargo metadata")?;
    let violations = check_packages(&metadata.packages);

    if violations.is_empty() {
        println!("arch-check: ok ({} crates)", metadata.packages.len());
        return Ok(());
    }

    for violation in &violations {
        eprintln!("arch-check: {violation}");
    }
    anyhow::bail!("{} dependency rule violation(s)", violations.len())
}

fn check_packages(packages: &[Package]) -> Vec<String> {
    let allowed: HashMap<&str, &[&str]> = ALLOWED_INTERNAL_DEPS.iter().copied().collect();
    let mut violations = Vec::new();

    for package in packages {
        let Some(allowed_internal) = allowed.get(package.name.as_str()) else {
            violations.push(format!("{} is not a known workspace crate", package.name));
            continue;
        };
        let pure = allowed_internal.is_empty() && package.name != "xtask";

        // dev-dependencies don't ship
        for dep in package
            .dependencies
            .iter()
            .filter(|d| d.kind.as_deref() != Some("dev"))
        {
            if allowed.contains_key(dep.name.as_str())
                && !allowed_internal.contains(&dep.name.as_str())
            {
                violations.push(format!("{} must not depend on {}", package.name, dep.name));
            }
            if pure && FORBIDDEN_IN_PURE_CRATES.contains(&dep.name.as_str()) {
                violations.push(format!(
                    "{} must stay free of I/O but depends on {}",
                    package.name, dep.name
                ));
            }
        }
    }

    violations
}
