#![no_main]

use dagpath_core::analyze;
use dagpath_core::model::GraphData;
use libfuzzer_sys::fuzz_target;

// Keep inputs small enough that a single run stays fast.
const MAX_VERTICES: usize = 4096;

fuzz_target!(|data: &[u8]| {
    let Ok(graph) = serde_json::from_slice::<GraphData>(data) else {
        return;
    };
    if graph.n > MAX_VERTICES {
        return;
    }
    let Ok(view) = graph.to_view() else {
        return;
    };

    let analysis = analyze(&view, graph.source).expect("validated source");
    let covered: usize = analysis.components.iter().map(|c| c.len()).sum();
    assert_eq!(covered, graph.n);

    if let Some(paths) = analysis.paths {
        let critical = paths.critical_path;
        assert_eq!(critical.path.first(), Some(&graph.source));
        assert_eq!(critical.path.last(), Some(&critical.target));
    }
});
