//! Structural constraints between target and effector tokens.

use std::fmt;
use std::sync::Arc;

use ndarray::{Array2, ArrayView1, ArrayView2, Zip};
use serde::Deserialize;
use symreg_core::tree::ancestors;
use symreg_core::{Library, LibraryError};

use crate::mask::{forbid, isin};
use crate::prior::{zeros, Prior};

/// Position of a target relative to an effector in the partial tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    /// Target is the immediate child of an effector.
    Child,
    /// Target is anywhere below an effector.
    Descendant,
    /// Target and effector share a parent.
    Sibling,
    /// Target is the only distinct child of an effector.
    #[serde(rename = "uchild")]
    UniqueChild,
}

impl Relationship {
    /// Check if effectors of this relationship must have children.
    pub fn requires_parent_effectors(self) -> bool {
        !matches!(self, Relationship::Sibling)
    }

    fn phrase(self) -> &'static str {
        match self {
            Relationship::Child => "a child",
            Relationship::Descendant => "a descendant",
            Relationship::Sibling => "a sibling",
            Relationship::UniqueChild => "the only unique child",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relationship::Child => "child",
            Relationship::Descendant => "descendant",
            Relationship::Sibling => "sibling",
            Relationship::UniqueChild => "uchild",
        })
    }
}

/// Forbids any of `targets` from being the `relationship` of any of
/// `effectors`.
#[derive(Debug, Clone)]
pub struct RelationalConstraint {
    library: Arc<Library>,
    name: &'static str,
    targets: Vec<usize>,
    effectors: Vec<usize>,
    relationship: Relationship,
}

impl RelationalConstraint {
    /// Create a constraint over token ids.
    pub fn new(
        library: Arc<Library>,
        targets: Vec<usize>,
        effectors: Vec<usize>,
        relationship: Relationship,
    ) -> Self {
        Self {
            library,
            name: "RelationalConstraint",
            targets,
            effectors,
            relationship,
        }
    }

    /// Create a constraint over token names.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::TokenNotFound`] if a name is not in the library.
    pub fn from_names<S: AsRef<str>>(
        library: Arc<Library>,
        targets: &[S],
        effectors: &[S],
        relationship: Relationship,
    ) -> Result<Self, LibraryError> {
        let targets = library.actionize(targets)?;
        let effectors = library.actionize(effectors)?;
        Ok(Self::new(library, targets, effectors, relationship))
    }

    /// Trig tokens may not descend from trig tokens.
    pub fn trig(library: Arc<Library>) -> Self {
        let trig = library.trig_tokens().to_vec();
        Self::new(library, trig.clone(), trig, Relationship::Descendant).with_name("TrigConstraint")
    }

    /// The constant token may not be the only unique child of an operator.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::TokenNotFound`] if the library has no constant.
    pub fn constant(library: Arc<Library>) -> Result<Self, LibraryError> {
        let target = library
            .const_token()
            .ok_or_else(|| LibraryError::TokenNotFound(symreg_core::CONST_NAME.to_owned()))?;
        let effectors = library
            .unary_tokens()
            .iter()
            .chain(library.binary_tokens())
            .copied()
            .collect();
        Ok(Self::new(library, vec![target], effectors, Relationship::UniqueChild)
            .with_name("ConstConstraint"))
    }

    /// Label descriptions with a specialization name.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn effectors(&self) -> &[usize] {
        &self.effectors
    }

    pub fn relationship(&self) -> Relationship {
        self.relationship
    }

    /// Compute the constraint array. Shared with rules composed of
    /// relational constraints.
    pub(crate) fn constrain(
        &self,
        actions: ArrayView2<'_, usize>,
        parent: ArrayView1<'_, usize>,
        sibling: ArrayView1<'_, usize>,
    ) -> Array2<f32> {
        let library = &self.library;
        let mut prior = zeros(actions, library);

        match self.relationship {
            Relationship::Descendant => {
                let mask = ancestors(actions, library.arities(), &self.effectors);
                forbid(&mut prior, mask.view(), &self.targets);
            }
            Relationship::Child => {
                let parents = library.parent_codes(&self.effectors);
                forbid(&mut prior, isin(parent, &parents).view(), &self.targets);
            }
            Relationship::Sibling => {
                // Symmetric: forbid each side next to the other.
                forbid(&mut prior, isin(sibling, &self.effectors).view(), &self.targets);
                forbid(&mut prior, isin(sibling, &self.targets).view(), &self.effectors);
            }
            Relationship::UniqueChild => {
                let unary_effectors: Vec<usize> = self
                    .effectors
                    .iter()
                    .copied()
                    .filter(|id| library.unary_tokens().contains(id))
                    .collect();
                let unary_parents = library.parent_codes(&unary_effectors);
                let parents = library.parent_codes(&self.effectors);
                // A unary effector has only one child; a binary effector
                // whose first child is already a target must not get another.
                let mask = Zip::from(parent).and(sibling).map_collect(|p, s| {
                    unary_parents.contains(p)
                        || (self.targets.contains(s) && parents.contains(p))
                });
                forbid(&mut prior, mask.view(), &self.targets);
            }
        }

        prior
    }
}

impl Prior for RelationalConstraint {
    fn name(&self) -> &'static str {
        self.name
    }

    fn library(&self) -> &Arc<Library> {
        &self.library
    }

    fn validate(&self) -> Result<(), String> {
        if self.relationship.requires_parent_effectors()
            && self
                .effectors
                .iter()
                .any(|id| self.library.terminal_tokens().contains(id))
        {
            let rel = self.relationship.to_string();
            let mut chars = rel.chars();
            let capitalized: String = chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect())
                .unwrap_or_default();
            return Err(format!(
                "{capitalized} relationship cannot have terminal effectors."
            ));
        }
        if self.targets.is_empty() {
            return Err("There are no target Tokens.".to_owned());
        }
        if self.effectors.is_empty() {
            return Err("There are no effector Tokens.".to_owned());
        }
        Ok(())
    }

    fn call(
        &mut self,
        actions: ArrayView2<'_, usize>,
        parent: ArrayView1<'_, usize>,
        sibling: ArrayView1<'_, usize>,
        _dangling: ArrayView1<'_, usize>,
    ) -> Array2<f32> {
        self.constrain(actions, parent, sibling)
    }

    fn describe(&self) -> String {
        format!(
            "{}: [{}] cannot be {} of [{}].",
            self.name,
            self.library.join_names(&self.targets),
            self.relationship.phrase(),
            self.library.join_names(&self.effectors)
        )
    }
}
