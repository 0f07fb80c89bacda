//! Common utilities for benchmarks

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// A matching `npm ls` tree and `npm ls --parseable` list.
///
/// `pkg{i}` sits at the top level with `deps` nested children and a collapsed
/// reference to `pkg{i+1}`, so resolving `pkg0` walks every package.
pub fn synthetic_reports(packages: usize, deps: usize) -> (String, String) {
    let root = "/bench/app";
    let mut tree = format!("app@1.0.0 {}\n", root);
    let mut list = format!("{}\n", root);

    for i in 0..packages {
        let last = i + 1 == packages;
        let (branch, rail) = if last { ("└─┬ ", "  ") } else { ("├─┬ ", "│ ") };
        let dir = format!("{}/node_modules/pkg{}", root, i);

        tree.push_str(&format!("{}pkg{}@1.0.{}\n", branch, i, i % 7));
        list.push_str(&format!("{}\n", dir));

        for j in 0..deps {
            tree.push_str(&format!("{}├── dep{}-{}@2.0.0\n", rail, i, j));
            list.push_str(&format!("{}/node_modules/dep{}-{}\n", dir, i, j));
        }

        let next = (i + 1) % packages;
        tree.push_str(&format!("{}└── pkg{}@1.0.{} deduped\n", rail, next, next % 7));
        list.push_str(&format!("{}/node_modules/pkg{}\n", root, next));
    }

    (tree, list)
}

/// pluck.toml requesting `count` packages
pub fn synthetic_config(count: usize) -> String {
    let packages: Vec<String> = (0..count).map(|i| format!("\"pkg{}@1.0.{}\"", i, i % 7)).collect();
    format!(
        "[extract]\npackages = [{}]\ntarget-dir = \"web/vendor\"\n\n[npm]\nregistry = \"https://registry.example.com/\"\nls-arguments = [\"--all\"]\n\n[[proxy]]\nid = \"corp\"\nprotocol = \"https\"\nhost = \"proxy.corp\"\nport = 8080\n",
        packages.join(", ")
    )
}
