use std::collections::BTreeMap;
use std::path::PathBuf;

use setup_metadata::get_package_metadata;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(dir), Some(package)) = (args.next(), args.next()) else {
        eprintln!("usage: collect_metadata <project-dir> <package-name> [module=pattern ...]");
        std::process::exit(2);
    };

    let mut patterns: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for arg in args {
        if let Some((module, pattern)) = arg.split_once('=') {
            patterns
                .entry(module.to_string())
                .or_default()
                .push(pattern.to_string());
        }
    }

    let md = match get_package_metadata(&PathBuf::from(dir), &package, &patterns) {
        Ok(md) => md,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    println!("=== Package Metadata ===");
    println!("Name:              {}", md.name);
    println!("Version:           {}", md.version);
    println!(
        "Long description:  {} bytes",
        md.long_description.len()
    );
    println!("install_requires:");
    for req in &md.install_requires {
        println!("  {req}");
    }
    println!("extras_require:");
    for (extra, reqs) in &md.extras_require {
        println!("  [{extra}]");
        for req in reqs {
            println!("    {req}");
        }
    }
    println!("tests_require:");
    for req in &md.tests_require {
        println!("  {req}");
    }
    if !md.dependency_links.is_empty() {
        println!("dependency_links:");
        for link in &md.dependency_links {
            println!("  {link}");
        }
    }
    for (module, files) in &md.package_data {
        println!("package_data[{module}]: {}", files.join(" "));
    }
}
