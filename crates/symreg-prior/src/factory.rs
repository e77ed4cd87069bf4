//! Building a [`JointPrior`] from configuration.

use std::fmt;
use std::sync::Arc;

use serde_yaml::{Mapping, Value};
use symreg_core::{Library, LibraryError};
use tracing::{debug, info, warn};

use crate::binding::{MutationMenu, SequencePositionsConstraint};
use crate::config::{
    parse, take_switch, LanguageModelParams, LengthParams, NoParams, PriorConfig,
    RelationalParams, RepeatParams, SequencePositionsParams, SoftLengthParams,
};
use crate::error::PriorError;
use crate::inverse::InverseUnaryConstraint;
use crate::joint::JointPrior;
use crate::language_model::{LanguageModelPrior, SequenceScorer};
use crate::length::LengthConstraint;
use crate::no_inputs::NoInputsConstraint;
use crate::prior::Prior;
use crate::relational::RelationalConstraint;
use crate::repeat::RepeatConstraint;
use crate::soft::{SoftLengthPrior, UniformArityPrior};

const HEADER: &str = "-- BUILDING PRIOR -------------------";
const FOOTER: &str = "-------------------------------------";

/// Collaborators some rules need but configuration cannot describe.
#[derive(Default)]
pub struct PriorResources {
    scorer: Option<Box<dyn SequenceScorer>>,
}

impl PriorResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply the scorer for a `language_model` entry.
    pub fn with_scorer(mut self, scorer: Box<dyn SequenceScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }
}

impl fmt::Debug for PriorResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorResources")
            .field("scorer", &self.scorer.is_some())
            .finish()
    }
}

/// The assembled prior plus one diagnostic per skipped entry.
#[derive(Debug)]
pub struct PriorReport {
    pub prior: JointPrior,
    pub warnings: Vec<String>,
}

impl PriorReport {
    /// Human-readable build summary.
    pub fn summary(&self) -> String {
        let mut lines = vec![HEADER.to_owned()];
        lines.extend(self.warnings.iter().map(|w| format!("WARNING: {w}")));
        if !self.prior.is_empty() {
            lines.push(self.prior.describe());
        }
        lines.push(FOOTER.to_owned());
        lines.join("\n")
    }
}

/// Outcome of constructing one entry whose parameters parsed.
struct Attempt {
    built: Result<Box<dyn Prior>, PriorError>,
}

fn attempt<P: Prior + 'static>(build: impl FnOnce() -> Result<P, PriorError>) -> Attempt {
    Attempt {
        built: build().map(|p| Box::new(p) as Box<dyn Prior>),
    }
}

/// One-line flow rendering of configuration arguments, e.g. `{tokens: [x7], max_: 1}`.
fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(args) => render_args(args),
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, render(&tagged.value)),
    }
}

fn render_args(args: &Mapping) -> String {
    let pairs: Vec<String> = args
        .iter()
        .map(|(k, v)| format!("{}: {}", render(k), render(v)))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

type Build = fn(&Arc<Library>, Mapping, &mut PriorResources) -> Result<Attempt, PriorError>;

/// A registered rule: config key, type name, constructor.
struct Rule {
    key: &'static str,
    name: &'static str,
    build: Build,
}

const RULES: &[Rule] = &[
    Rule { key: "relational", name: "RelationalConstraint", build: build_relational },
    Rule { key: "length", name: "LengthConstraint", build: build_length },
    Rule { key: "repeat", name: "RepeatConstraint", build: build_repeat },
    Rule { key: "inverse", name: "InverseUnaryConstraint", build: build_inverse },
    Rule { key: "trig", name: "TrigConstraint", build: build_trig },
    Rule { key: "const", name: "ConstConstraint", build: build_const },
    Rule { key: "no_inputs", name: "NoInputsConstraint", build: build_no_inputs },
    Rule { key: "soft_length", name: "SoftLengthPrior", build: build_soft_length },
    Rule { key: "uniform_arity", name: "UniformArityPrior", build: build_uniform_arity },
    Rule { key: "seq_positions", name: "SequencePositionsConstraint", build: build_seq_positions },
    Rule { key: "language_model", name: "LanguageModelPrior", build: build_language_model },
];

/// Config keys the factory understands, in registry order.
pub fn rule_keys() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|r| r.key)
}

fn lookup(key: &Value) -> Result<&'static Rule, PriorError> {
    let name = key
        .as_str()
        .ok_or_else(|| PriorError::UnknownRule(format!("{key:?}")))?;
    RULES
        .iter()
        .find(|r| r.key == name)
        .ok_or_else(|| PriorError::UnknownRule(name.to_owned()))
}

fn build_relational(
    library: &Arc<Library>,
    args: Mapping,
    _: &mut PriorResources,
) -> Result<Attempt, PriorError> {
    let params: RelationalParams = parse("RelationalConstraint", args)?;
    Ok(attempt(|| {
        Ok(RelationalConstraint::from_names(
            library.clone(),
            params.targets.as_slice(),
            params.effectors.as_slice(),
            params.relationship,
        )?)
    }))
}

fn build_length(
    library: &Arc<Library>,
    args: Mapping,
    _: &mut PriorResources,
) -> Result<Attempt, PriorError> {
    let params: LengthParams = parse("LengthConstraint", args)?;
    Ok(attempt(|| {
        LengthConstraint::new(library.clone(), params.min, params.max)
    }))
}

fn build_repeat(
    library: &Arc<Library>,
    args: Mapping,
    _: &mut PriorResources,
) -> Result<Attempt, PriorError> {
    let params: RepeatParams = parse("RepeatConstraint", args)?;
    Ok(attempt(|| {
        let tokens = library.actionize(params.tokens.as_slice())?;
        RepeatConstraint::new(library.clone(), tokens, params.min, params.max)
    }))
}

fn build_inverse(
    library: &Arc<Library>,
    args: Mapping,
    _: &mut PriorResources,
) -> Result<Attempt, PriorError> {
    let params: NoParams = parse("InverseUnaryConstraint", args)?;
    Ok(attempt(|| Ok(InverseUnaryConstraint::new(library.clone()))))
}

fn build_trig(
    library: &Arc<Library>,
    args: Mapping,
    _: &mut PriorResources,
) -> Result<Attempt, PriorError> {
    let params: NoParams = parse("TrigConstraint", args)?;
    Ok(attempt(|| Ok(RelationalConstraint::trig(library.clone()))))
}

fn build_const(
    library: &Arc<Library>,
    args: Mapping,
    _: &mut PriorResources,
) -> Result<Attempt, PriorError> {
    let params: NoParams = parse("ConstConstraint", args)?;
    Ok(attempt(|| Ok(RelationalConstraint::constant(library.clone())?)))
}

fn build_no_inputs(
    library: &Arc<Library>,
    args: Mapping,
    _: &mut PriorResources,
) -> Result<Attempt, PriorError> {
    let params: NoParams = parse("NoInputsConstraint", args)?;
    Ok(attempt(|| Ok(NoInputsConstraint::new(library.clone()))))
}

fn build_soft_length(
    library: &Arc<Library>,
    args: Mapping,
    _: &mut PriorResources,
) -> Result<Attempt, PriorError> {
    let params: SoftLengthParams = parse("SoftLengthPrior", args)?;
    Ok(attempt(|| {
        Ok(SoftLengthPrior::new(library.clone(), params.loc, params.scale))
    }))
}

fn build_uniform_arity(
    library: &Arc<Library>,
    args: Mapping,
    _: &mut PriorResources,
) -> Result<Attempt, PriorError> {
    let params: NoParams = parse("UniformArityPrior", args)?;
    Ok(attempt(|| Ok(UniformArityPrior::new(library.clone()))))
}

fn build_seq_positions(
    library: &Arc<Library>,
    args: Mapping,
    _: &mut PriorResources,
) -> Result<Attempt, PriorError> {
    let params: SequencePositionsParams = parse("SequencePositionsConstraint", args)?;
    Ok(attempt(|| {
        let menu = MutationMenu::from_path(&params.menu_file)?;
        SequencePositionsConstraint::new(library.clone(), &menu, params.mode, params.biasing_factor)
    }))
}

fn build_language_model(
    library: &Arc<Library>,
    args: Mapping,
    resources: &mut PriorResources,
) -> Result<Attempt, PriorError> {
    let params: LanguageModelParams = parse("LanguageModelPrior", args)?;
    Ok(attempt(|| {
        let scorer = resources.scorer.take().ok_or_else(|| {
            PriorError::MissingResource("No sequence scorer was supplied.".to_owned())
        })?;
        Ok(LanguageModelPrior::new(library.clone(), scorer, params.weight))
    }))
}

/// Entries of one rule key: a mapping, a list of mappings, or nothing.
fn entries(rule: &Rule, value: &Value) -> Result<Vec<Mapping>, PriorError> {
    match value {
        Value::Null => Ok(vec![Mapping::new()]),
        Value::Mapping(args) => Ok(vec![args.clone()]),
        Value::Sequence(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => Ok(Mapping::new()),
                Value::Mapping(args) => Ok(args.clone()),
                other => Err(PriorError::invalid(
                    rule.name,
                    format!("expected a mapping of arguments, got {other:?}"),
                )),
            })
            .collect(),
        other => Err(PriorError::invalid(
            rule.name,
            format!("expected a mapping or list of mappings, got {other:?}"),
        )),
    }
}

/// Recoverable construction failures become a skip reason; the rest abort.
fn skip_reason(error: PriorError) -> Result<String, PriorError> {
    match error {
        PriorError::Library(LibraryError::TokenNotFound(_)) => {
            Ok("Uses Tokens not in the Library.".to_owned())
        }
        PriorError::MissingResource(reason) => Ok(reason),
        fatal => Err(fatal),
    }
}

/// Build every enabled entry of `config` into one joint prior.
///
/// Entries whose tokens are missing from `library`, whose resources are
/// unavailable, or that fail [`Prior::validate`] are skipped with a warning.
///
/// # Errors
///
/// Unknown rule keys, malformed parameters and unsupported parameter
/// combinations abort the build.
pub fn make_prior(
    library: Arc<Library>,
    config: &PriorConfig,
    resources: &mut PriorResources,
) -> Result<PriorReport, PriorError> {
    let mut priors: Vec<Box<dyn Prior>> = Vec::new();
    let mut warnings = Vec::new();

    for (key, value) in config.rules() {
        let rule = lookup(key)?;
        for mut args in entries(rule, value)? {
            if !take_switch(rule.name, &mut args)? {
                debug!(rule = rule.key, "prior disabled");
                continue;
            }

            let params = render_args(&args);
            let Attempt { built } = (rule.build)(&library, args, resources)?;
            let reason = match built {
                Ok(prior) => match prior.validate() {
                    Ok(()) => {
                        priors.push(prior);
                        continue;
                    }
                    Err(reason) => reason,
                },
                Err(error) => skip_reason(error)?,
            };

            let message = format!(
                "Skipping invalid '{}' with arguments {}. Reason: {}",
                rule.name, params, reason
            );
            warn!("{message}");
            warnings.push(message);
        }
    }

    let report = PriorReport {
        prior: JointPrior::new(library, priors)?,
        warnings,
    };
    info!("\n{}", report.summary());
    Ok(report)
}
