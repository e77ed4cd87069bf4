//! End-to-end scenarios: configuration in, per-step adjustments out.

use std::io::Write;
use std::sync::Arc;

use ndarray::{array, Array2, ArrayView1};
use symreg_core::Library;
use symreg_prior::mask::allowed_tokens;
use symreg_prior::{make_prior, PriorConfig, PriorError, PriorReport, PriorResources, SequenceScorer};

/// x1 x2 add mul sin cos exp log const
fn library() -> Arc<Library> {
    Arc::new(
        Library::with_functions(2, &["add", "mul", "sin", "cos", "exp", "log", "const"])
            .expect("library should be valid"),
    )
}

fn build(library: &Arc<Library>, yaml: &str) -> PriorReport {
    let config = PriorConfig::from_yaml_str(yaml).expect("config should parse");
    make_prior(library.clone(), &config, &mut PriorResources::new()).expect("prior should build")
}

fn id(library: &Library, name: &str) -> usize {
    library.index_of(name).expect("token should exist")
}

const STANDARD: &str = "\
length:
  min_: 4
  max_: 30
repeat:
  tokens: const
  max_: 3
relational:
  targets: [x1]
  effectors: [log]
  relationship: child
inverse: {}
trig: {}
const: {}
no_inputs: {}
uniform_arity: {}
";

#[test]
fn test_standard_config_builds_cleanly() {
    let lib = library();
    let report = build(&lib, STANDARD);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(
        report.prior.names(),
        [
            "LengthConstraint",
            "RepeatConstraint",
            "RelationalConstraint",
            "InverseUnaryConstraint",
            "TrigConstraint",
            "ConstConstraint",
            "NoInputsConstraint",
            "UniformArityPrior",
        ]
    );
}

#[test]
fn test_summary_is_deterministic() {
    let lib = library();
    let yaml = "trig: {}\nrepeat: {tokens: [x7], max_: 1}\nlength: {max_: 12}\n";
    let first = build(&lib, yaml).summary();
    let second = build(&lib, yaml).summary();
    assert_eq!(first, second);
    assert_eq!(
        first,
        "-- BUILDING PRIOR -------------------\n\
         WARNING: Skipping invalid 'RepeatConstraint' with arguments \
         {tokens: [x7], max_: 1}. \
         Reason: Uses Tokens not in the Library.\n\
         TrigConstraint: [sin, cos] cannot be a descendant of [sin, cos].\n\
         LengthConstraint: Sequences have maximum length 12.\n\
         -------------------------------------"
    );
}

#[test]
fn test_unknown_rule() {
    let config = PriorConfig::from_yaml_str("trig: {}\nmystery: {}\n").expect("config should parse");
    let result = make_prior(library(), &config, &mut PriorResources::new());
    assert!(matches!(result, Err(PriorError::UnknownRule(name)) if name == "mystery"));
}

#[test]
fn test_disabled_entries_skip_validation() {
    let lib = library();
    // soft_length without parameters would fail validation if enabled
    let report = build(&lib, "soft_length: {on: false}\ntrig: {on: false}\n");
    assert!(report.prior.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_min_length_walkthrough() {
    let lib = library();
    let mut report = build(&lib, "length: {min_: 4, max_: 30}\n");
    let terminals = lib.terminal_tokens();

    let initial = report.prior.initial_prior();
    assert!(terminals.iter().all(|&t| initial[t] == f32::NEG_INFINITY));

    // sin(exp(·)): one slot open, length 2
    let actions = array![[id(&lib, "sin"), id(&lib, "exp")]];
    let prior = report.prior.call_signals(actions.view());
    let allowed = allowed_tokens(prior.row(0));
    assert!(terminals.iter().all(|t| !allowed.contains(t)));
    assert!(allowed.contains(&id(&lib, "add")));
}

#[test]
fn test_nested_trig_rejected_by_violation_hook() {
    let lib = library();
    let mut report = build(&lib, STANDARD);
    let seq = |names: &[&str]| lib.actionize(names).expect("names should resolve");

    // x1 * sin(cos(x2)) + x1
    let nested = seq(&["add", "mul", "x1", "sin", "cos", "x2", "x1"]);
    assert_eq!(report.prior.first_violation(&nested), Some(4));

    // sin(x1) * cos(x2)
    let flat = seq(&["mul", "sin", "x1", "cos", "x2"]);
    assert!(!report.prior.violates(&flat));

    // exp(log(x1)) is too short and inverts itself
    let inverse = seq(&["exp", "log", "x1"]);
    assert!(report.prior.violates(&inverse));
}

#[test]
fn test_sequence_positions_from_menu_file() {
    let tokens = ["A", "C", "D", "E"]
        .into_iter()
        .map(|s| symreg_core::Token::new(s, 1))
        .collect();
    let lib = Arc::new(Library::new(tokens).expect("library should be valid"));

    let mut menu = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        menu,
        "Sequence:\n  master_sequence: ACDE\nAllowedMutations:\n  - [2, C, AD]\n  - [3, D, [D, E]]"
    )
    .expect("write menu");

    let yaml = format!(
        "seq_positions:\n  menu_file: {}\n  mode: short\n",
        menu.path().display()
    );
    let mut report = build(&lib, &yaml);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    // short mode: step 0 is position 2 (A or D), step 1 is position 3 (D or E)
    let initial = report.prior.initial_prior();
    assert_eq!(allowed_tokens(initial.view()), vec![0, 2]);
    let prior = report.prior.call_signals(array![[0]].view());
    assert_eq!(allowed_tokens(prior.row(0)), vec![2, 3]);
}

#[test]
fn test_missing_menu_file_is_a_warning() {
    let lib = library();
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.yaml");
    let yaml = format!("seq_positions:\n  menu_file: {}\ntrig: {{}}\n", path.display());

    let report = build(&lib, &yaml);
    assert_eq!(report.prior.names(), ["TrigConstraint"]);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with("Skipping invalid 'SequencePositionsConstraint'"));
    assert!(report.warnings[0].contains("Could not open/read file"));
}

/// Scores every token with the number of calls since the last reset.
struct StepScorer {
    step: f32,
    n_tokens: usize,
}

impl SequenceScorer for StepScorer {
    fn reset(&mut self) {
        self.step = 0.0;
    }

    fn score(&mut self, last_action: ArrayView1<'_, usize>) -> Array2<f32> {
        self.step += 1.0;
        Array2::from_elem((last_action.len(), self.n_tokens), self.step)
    }
}

#[test]
fn test_language_model_from_resources() {
    let lib = library();
    let config = PriorConfig::from_yaml_str("language_model: {weight: 2.0}\n").expect("config");
    let mut resources = PriorResources::new().with_scorer(Box::new(StepScorer {
        step: 10.0,
        n_tokens: lib.len(),
    }));
    let mut report = make_prior(lib.clone(), &config, &mut resources).expect("prior");
    assert!(report.warnings.is_empty());

    let add = id(&lib, "add");
    let first = report.prior.call_signals(array![[add]].view());
    let second = report.prior.call_signals(array![[add, add]].view());
    assert_eq!(first[[0, 0]], 2.0);
    assert_eq!(second[[0, 0]], 4.0);
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(STANDARD.as_bytes()).expect("write config");
    let config = PriorConfig::from_path(file.path()).expect("config should load");
    assert_eq!(config.len(), 8);

    let missing = PriorConfig::from_path("/nonexistent/prior.yaml");
    assert!(matches!(missing, Err(PriorError::Io(_))));
}
