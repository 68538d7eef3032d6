//! Walkthrough of inserts, lazy selector increments and aggregate reads.
//!
//! Every repository event is logged at debug level.

use delta_trie::{ConverterPipeline, HookError, Repository, ValidatorPipeline};

fn build_repo() -> Repository {
    Repository::new()
        .with_validator(ValidatorPipeline::new().with_hook(
            |pattern: &str| -> Result<(), HookError> {
                if pattern.contains(' ') {
                    return Err("spacing is not allowed".into());
                }
                Ok(())
            },
        ))
        .with_converter(ConverterPipeline::new().with_hook(|pattern: &str| pattern.to_lowercase()))
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let repo = build_repo();
    for key in ["home/", "home/user/", "home/bin/", "home/bin/tar", "root/etc"] {
        if let Err(e) = repo.insert(key, 1) {
            println!("insert {key}: {e}");
        }
    }

    println!("=== After insertion ===");
    repo.debug_print();

    // "root/" was never inserted itself: the delta is kept but reported.
    for pattern in ["root/*", "Home/Bin/*"] {
        if let Err(e) = repo.inc(pattern) {
            println!("inc {pattern}: {e}");
        }
    }
    if let Err(e) = repo.insert("home/*", 1) {
        println!("insert home/*: {e}");
    }
    if let Err(e) = repo.insert("home bin", 1) {
        println!("insert \"home bin\": {e}");
    }

    println!("=== After increments ===");
    repo.debug_print();

    for pattern in ["*", "home/*", "root/*", "home/bin/tar", "zzz"] {
        let value = repo.get_value(pattern).unwrap_or_default();
        let map = repo.get_map(pattern).unwrap_or_default();
        println!("pattern: {pattern} value: {value} map: {map:?}");
    }
    println!("size: {}", repo.size());
}
