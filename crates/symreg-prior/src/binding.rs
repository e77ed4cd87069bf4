//! Position-wise constraints for fixed-length categorical sequences.
//!
//! A [`MutationMenu`] pairs a master sequence with the positions that may
//! deviate from it and the symbols each of those positions allows. The menu is
//! read from YAML:
//!
//! ```yaml
//! Sequence:
//!   master_sequence: ACDE
//! AllowedMutations:
//!   - [2, C, AD]          # 1-based position, original symbol, allowed symbols
//!   - [4, E, [E, A]]
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::Deserialize;
use symreg_core::Library;
use tracing::warn;

use crate::error::PriorError;
use crate::mask::forbid_columns;
use crate::prior::{zeros, Prior};

/// Allowed symbols, written either as one string of single-character symbols
/// or as an explicit list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AllowedSymbols {
    Chars(String),
    List(Vec<String>),
}

impl AllowedSymbols {
    fn into_names(self) -> Vec<String> {
        match self {
            AllowedSymbols::Chars(s) => s.chars().map(String::from).collect(),
            AllowedSymbols::List(names) => names,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MenuSequence {
    master_sequence: String,
}

#[derive(Debug, Deserialize)]
struct MenuDocument {
    #[serde(rename = "Sequence")]
    sequence: MenuSequence,
    #[serde(rename = "AllowedMutations", default)]
    allowed_mutations: Vec<(usize, serde_yaml::Value, AllowedSymbols)>,
}

/// Master sequence plus the ordered table of mutable positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationMenu {
    master: Vec<String>,
    /// 0-based position and its allowed symbols, in file order.
    allowed: Vec<(usize, Vec<String>)>,
}

impl MutationMenu {
    /// Parse a menu document.
    ///
    /// # Errors
    ///
    /// Returns [`PriorError::Yaml`] on malformed YAML and
    /// [`PriorError::InvalidParameters`] when a position is `0`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PriorError> {
        let doc: MenuDocument = serde_yaml::from_str(yaml)?;
        let master = doc
            .sequence
            .master_sequence
            .chars()
            .map(String::from)
            .collect();

        let mut allowed: Vec<(usize, Vec<String>)> = Vec::new();
        for (position, _, symbols) in doc.allowed_mutations {
            let position = position.checked_sub(1).ok_or_else(|| {
                PriorError::invalid(
                    "SequencePositionsConstraint",
                    "AllowedMutations positions start at 1.",
                )
            })?;
            let symbols = symbols.into_names();
            match allowed.iter_mut().find(|(p, _)| *p == position) {
                Some(entry) => entry.1 = symbols,
                None => allowed.push((position, symbols)),
            }
        }

        Ok(Self { master, allowed })
    }

    /// Read and parse a menu file.
    ///
    /// # Errors
    ///
    /// A file that does not exist is reported as
    /// [`PriorError::MissingResource`]; other failures as in
    /// [`from_yaml_str`](Self::from_yaml_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PriorError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), "could not open menu file");
                PriorError::MissingResource(format!(
                    "Could not open/read file: {}",
                    path.display()
                ))
            } else {
                PriorError::Io(e)
            }
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn master(&self) -> &[String] {
        &self.master
    }

    pub fn allowed(&self) -> &[(usize, Vec<String>)] {
        &self.allowed
    }
}

/// How a generation step maps onto the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    /// Step `p` generates absolute position `p` of the sequence.
    #[default]
    Full,
    /// Step `p` generates the `p`-th mutable position only.
    Short,
}

impl fmt::Display for PositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionMode::Full => write!(f, "full"),
            PositionMode::Short => write!(f, "short"),
        }
    }
}

/// Keeps generated sequences on the mutation menu.
#[derive(Debug, Clone)]
pub struct SequencePositionsConstraint {
    library: Arc<Library>,
    mode: PositionMode,
    biasing_factor: f32,
    master: Vec<usize>,
    allowed: Vec<(usize, Vec<usize>)>,
}

impl SequencePositionsConstraint {
    /// # Errors
    ///
    /// Returns [`PriorError::Library`] if the menu uses symbols the library
    /// does not define.
    pub fn new(
        library: Arc<Library>,
        menu: &MutationMenu,
        mode: PositionMode,
        biasing_factor: f32,
    ) -> Result<Self, PriorError> {
        let master = library.actionize(menu.master())?;
        let allowed = menu
            .allowed()
            .iter()
            .map(|(position, names)| Ok((*position, library.actionize(names.as_slice())?)))
            .collect::<Result<Vec<_>, PriorError>>()?;
        Ok(Self {
            library,
            mode,
            biasing_factor,
            master,
            allowed,
        })
    }

    pub fn mode(&self) -> PositionMode {
        self.mode
    }

    fn outside(&self, allowed: &[usize]) -> Vec<usize> {
        (0..self.library.len())
            .filter(|t| !allowed.contains(t))
            .collect()
    }

    fn apply(&self, prior: &mut Array2<f32>, step: usize) {
        let Some(&master) = self.master.get(step) else {
            return;
        };

        if self.biasing_factor > 0.0 {
            prior.column_mut(master).fill(self.biasing_factor.ln());
        }

        let forbidden = match self.mode {
            PositionMode::Short => match self.allowed.get(step) {
                Some((_, symbols)) => self.outside(symbols),
                None => return,
            },
            PositionMode::Full => match self.allowed.iter().find(|(p, _)| *p == step) {
                Some((_, symbols)) => self.outside(symbols),
                None => self.outside(&[master]),
            },
        };
        forbid_columns(prior, &forbidden);
    }
}

impl Prior for SequencePositionsConstraint {
    fn name(&self) -> &'static str {
        "SequencePositionsConstraint"
    }

    fn library(&self) -> &Arc<Library> {
        &self.library
    }

    fn initial_prior(&self) -> Array1<f32> {
        let mut prior = Array2::zeros((1, self.library.len()));
        self.apply(&mut prior, 0);
        prior.row(0).to_owned()
    }

    fn call(
        &mut self,
        actions: ArrayView2<'_, usize>,
        _parent: ArrayView1<'_, usize>,
        _sibling: ArrayView1<'_, usize>,
        _dangling: ArrayView1<'_, usize>,
    ) -> Array2<f32> {
        let mut prior = zeros(actions, &self.library);
        self.apply(&mut prior, actions.ncols());
        prior
    }

    fn describe(&self) -> String {
        format!(
            "{}: Sequence positions constraint: {} mode.",
            self.name(),
            self.mode
        )
    }
}
