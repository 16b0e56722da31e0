mod common;

use std::sync::Mutex;

use assert_matches::assert_matches;

use biorem_engine::app::{App, ConsortiumOptions, NoopSink, Phase, ProgressEvent, ProgressSink};
use biorem_engine::config::UploadSettings;
use biorem_engine::domain::ReferenceSource;
use biorem_engine::error::EngineError;

#[derive(Default)]
struct RecordingSink {
    phases: Mutex<Vec<Phase>>,
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: ProgressEvent) {
        self.phases.lock().unwrap().push(event.phase);
    }
}

const UPLOAD: &str = ">S1\nK00001\nK00002\n>S2\nK00001\nK00003\nK99999\n";

#[test]
fn run_produces_all_tables() {
    let catalog = common::catalog();
    let app = App::new(&catalog, UploadSettings::default());
    let sink = RecordingSink::default();
    let result = app.run(UPLOAD, &sink).unwrap();

    assert_eq!(result.samples, 2);
    assert_eq!(result.upload.accepted, 5);
    assert_eq!(result.tables.len(), 4);
    assert_eq!(result.table(ReferenceSource::Bioremediation).len(), 5);
    assert_eq!(result.table(ReferenceSource::Degradation).len(), 2);
    assert_eq!(result.toxicity.len(), 3);
    assert_eq!(result.reports.len(), 4);

    let phases = sink.phases.lock().unwrap();
    assert_eq!(phases.first(), Some(&Phase::Parse));
    assert_eq!(phases.last(), Some(&Phase::Reshape));
    assert_eq!(
        phases.iter().filter(|phase| **phase == Phase::Integrate).count(),
        4
    );
}

#[test]
fn run_serializes_as_records() {
    let catalog = common::catalog();
    let app = App::new(&catalog, UploadSettings::default());
    let result = app.run(UPLOAD, &NoopSink).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    let first = &json["tables"]["bioremediation"]["table"][0];
    assert_eq!(first["Sample"], "S1");
    assert_eq!(first["KO"], "K00001");
    assert_eq!(first["Compound_Class"], "X");
    assert_eq!(json["toxicity"][0]["super_category"], "Nuclear Response");
    assert_eq!(json["toxicity"][0]["endpoint_prefix"], "NR");
}

#[test]
fn run_rejects_empty_upload() {
    let catalog = common::catalog();
    let app = App::new(&catalog, UploadSettings::default());
    assert_matches!(
        app.run("no samples here\n", &NoopSink),
        Err(EngineError::Validation { lines: 1 })
    );
}

#[test]
fn consortium_from_run() {
    let catalog = common::catalog();
    let app = App::new(&catalog, UploadSettings::default());
    let run = app.run(UPLOAD, &NoopSink).unwrap();
    let sink = RecordingSink::default();

    let result = app
        .consortium(&run, "X", ConsortiumOptions::default(), &sink)
        .unwrap();
    // S1 annotates {C0001, C0002}, S2 only {C0001}.
    assert_eq!(result.selected.len(), 1);
    let chosen = result.selected_groups().next().unwrap();
    assert!(chosen.members.contains("S1"));
    assert_eq!(*sink.phases.lock().unwrap(), vec![Phase::Minimize]);
}

#[test]
fn consortium_against_catalog_reports_gaps() {
    let catalog = common::catalog();
    let app = App::new(&catalog, UploadSettings::default());
    let run = app.run(">S1\nK00001\n", &NoopSink).unwrap();
    let options = ConsortiumOptions {
        source: ReferenceSource::Bioremediation,
        against_catalog: true,
    };
    let result = app.consortium(&run, "X", options, &NoopSink).unwrap();
    let warning = result.warning.unwrap();
    assert!(warning.uncovered.contains("C0002"));
}
