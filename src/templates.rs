//! Room templates and the interned template library.
//!
//! A [`RoomTemplate`] is a candidate footprint for a room: an outline
//! polygon plus a door placement policy and an optional display name. The
//! generator interns every template a level mentions into a
//! [`TemplateLibrary`], which assigns two integers per entry:
//!
//! - the **template id**, a dense index identifying the exact entry, and
//! - the **alias**, shared by all structurally identical entries (same
//!   outline and door mode, names ignored).
//!
//! Repeat-mode policies compare aliases, so renamed copies of one shape
//! still count as "the same room" for uniqueness purposes.

use crate::doors::{DoorHandler, DoorLine, DoorMode};
use crate::geometry::Polygon;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A candidate room footprint.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub outline: Polygon,
    pub doors: DoorMode,
    pub name: Option<String>,
}

impl RoomTemplate {
    /// Template with the given outline and door mode, unnamed.
    pub fn new(outline: Polygon, doors: DoorMode) -> Self {
        Self { outline, doors, name: None }
    }

    /// Attach a display name. Names do not affect aliasing.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Dense index of an interned template within a [`TemplateLibrary`].
pub type TemplateId = usize;

/// One interned template with its expanded door lines and alias.
#[derive(Clone, Debug)]
pub(crate) struct TemplateEntry {
    pub template: RoomTemplate,
    pub doors: Vec<DoorLine>,
    pub alias: usize,
}

/// Interning registry for every template a generation run touches.
///
/// Ids are assigned in first-seen order, so the library contents are a pure
/// function of the level description's traversal order.
#[derive(Clone, Debug, Default)]
pub(crate) struct TemplateLibrary {
    entries: Vec<TemplateEntry>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `template`, expanding its doors through `handler`.
    ///
    /// Re-interning an identical template returns the existing id. A
    /// template that differs only in name gets a fresh id but shares the
    /// alias of its structural twin.
    pub fn intern(
        &mut self,
        template: &RoomTemplate,
        handler: &dyn DoorHandler,
    ) -> Result<TemplateId> {
        if let Some(id) = self
            .entries
            .iter()
            .position(|e| e.template == *template)
        {
            return Ok(id);
        }
        let alias = self
            .entries
            .iter()
            .find(|e| {
                e.template.outline == template.outline && e.template.doors == template.doors
            })
            .map(|e| e.alias)
            .unwrap_or_else(|| self.next_alias());
        let doors = handler.door_lines(&template.outline, &template.doors)?;
        self.entries.push(TemplateEntry {
            template: template.clone(),
            doors,
            alias,
        });
        Ok(self.entries.len() - 1)
    }

    fn next_alias(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.alias + 1)
            .max()
            .unwrap_or(0)
    }

    #[inline]
    pub fn entry(&self, id: TemplateId) -> &TemplateEntry {
        &self.entries[id]
    }

    #[inline]
    pub fn outline(&self, id: TemplateId) -> &Polygon {
        &self.entries[id].template.outline
    }

    #[inline]
    pub fn doors(&self, id: TemplateId) -> &[DoorLine] {
        &self.entries[id].doors
    }

    /// The repeat-mode equivalence alias of a template.
    #[inline]
    pub fn alias_of(&self, id: TemplateId) -> usize {
        self.entries[id].alias
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Mean bounding-box diagonal across all interned templates.
    ///
    /// Seeds the annealing temperature so acceptance probabilities stay
    /// commensurate with the template scale.
    pub fn average_size(&self) -> f64 {
        if self.entries.is_empty() {
            return 1.0;
        }
        let total: f64 = self
            .entries
            .iter()
            .map(|e| e.template.outline.bounding_box().diagonal())
            .sum();
        total / self.entries.len() as f64
    }
}
