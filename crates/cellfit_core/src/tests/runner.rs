//! Runner tests drive a shell script through `/bin/sh`

#![cfg(unix)]

use std::fs;
use std::path::Path;

use crate::error::{Error, ExecutionError};
use crate::model::{Metric, ParameterVector};
use crate::params::Selector;
use crate::runner::{BlackBox, BlackBoxRunner, PathUpdater};

use super::fixtures::SettingsFile;

/// Counts its invocations and writes the running count into `output/count.txt`.
/// Exits with status 1 from invocation `fail_from` onwards.
fn stub_script(fail_from: Option<u32>) -> String {
    let fail = match fail_from {
        Some(n) => format!("if [ \"$n\" -ge {n} ]; then echo 'stub failure' >&2; exit 1; fi\n"),
        None => String::new(),
    };
    format!(
        "echo run >> invocations.log\n\
         n=$(wc -l < invocations.log)\n\
         {fail}\
         mkdir -p output\n\
         echo $n > output/count.txt\n"
    )
}

fn read_count(output_dir: &Path) -> crate::Result<Metric> {
    let path = output_dir.join("count.txt");
    let text = fs::read_to_string(&path).map_err(Error::io(&path))?;
    Ok(Metric::Scalar(text.trim().parse().unwrap_or(f64::NAN)))
}

fn invocations(root: &Path) -> usize {
    fs::read_to_string(root.join("invocations.log"))
        .map(|log| log.lines().count())
        .unwrap_or(0)
}

fn runner(file: &SettingsFile, fail_from: Option<u32>) -> BlackBoxRunner {
    fs::write(file.root().join("stub.sh"), stub_script(fail_from)).unwrap();
    BlackBoxRunner::new(file.root(), "/bin/sh", "output")
        .with_args(["stub.sh"])
        .with_updater(PathUpdater::new(file.codec(), "default"))
        .with_processor(read_count)
}

#[test]
fn one_metric_per_replicate() {
    let file = SettingsFile::new();
    let mut runner = runner(&file, None);
    let params = ParameterVector::new().with("cell/speed", 2.5);

    let metrics = runner.run(&params, 3, false).unwrap();
    assert_eq!(
        metrics,
        vec![Metric::Scalar(1.0), Metric::Scalar(2.0), Metric::Scalar(3.0)]
    );
    assert_eq!(invocations(file.root()), 3);
    assert!(!runner.output_dir().exists());

    let store = file
        .codec()
        .read(&Selector::new().with_cell_type("default"))
        .unwrap();
    assert_eq!(store.cell_type("default").unwrap().motility.speed(), 2.5);
}

#[test]
fn failing_replicate_stops_the_run() {
    let file = SettingsFile::new();
    let mut runner = runner(&file, Some(2));

    let result = runner.run(&ParameterVector::new(), 3, false);
    assert!(matches!(
        result,
        Err(Error::Execution(ExecutionError::Failed {
            replicate: 1,
            code: 1
        }))
    ));
    assert_eq!(invocations(file.root()), 2);
}

#[test]
fn missing_executable_is_a_spawn_error() {
    let file = SettingsFile::new();
    let mut runner = BlackBoxRunner::new(file.root(), "no-such-simulator", "output");
    let result = runner.run(&ParameterVector::new(), 1, false);
    assert!(matches!(
        result,
        Err(Error::Execution(ExecutionError::Spawn { .. }))
    ));
}

#[test]
fn kept_outputs_are_archived_per_replicate() {
    let file = SettingsFile::new();
    let archive = file.root().join("archive");
    let mut runner = runner(&file, None).with_archive_root(&archive);

    runner.run(&ParameterVector::new(), 2, true).unwrap();
    runner.run(&ParameterVector::new(), 1, true).unwrap();

    let mut runs: Vec<_> = fs::read_dir(&archive)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    runs.sort();
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|run| {
        run.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("run-"))
    }));

    let counts: Vec<String> = (0..2)
        .map(|i| fs::read_to_string(runs[0].join(format!("replicate-{i}/count.txt"))).unwrap())
        .collect();
    assert_eq!(counts, vec!["1\n", "2\n"]);
    assert!(runs[1].join("replicate-0/count.txt").exists());
    assert!(!runs[1].join("replicate-1").exists());
}

#[test]
fn black_box_uses_configured_replicates() {
    let file = SettingsFile::new();
    let mut runner = runner(&file, None).with_replicates(2, false);
    let metrics = runner.evaluate(&ParameterVector::new()).unwrap();
    assert_eq!(metrics.len(), 2);
    assert_eq!(invocations(file.root()), 2);
}
