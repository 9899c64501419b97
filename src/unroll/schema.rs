// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Slot-keyed accumulator for the identities a resolution call will fetch

/// A named resolution target within a document
///
/// Each slot statically carries its cardinality: the single-valued slots
/// hold at most one identity, the multi-valued slots hold an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    MainImage,
    PromotionalImage,
    LeadImages,
    Embeds,
}

impl Slot {
    pub fn is_single_valued(self) -> bool {
        matches!(self, Slot::MainImage | Slot::PromotionalImage)
    }
}

/// Per-call accumulator mapping slots to the identities requested for them
///
/// Created fresh for every resolution call and discarded afterwards.
/// Calls against a slot of the wrong cardinality are no-ops returning the
/// empty value, never an error.
#[derive(Debug, Default)]
pub struct ContentSchema {
    main_image: Option<String>,
    promotional_image: Option<String>,
    lead_images: Vec<String>,
    embeds: Vec<String>,
}

impl ContentSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identity for a single-valued slot; the first recorded
    /// identity wins
    pub fn put(&mut self, slot: Slot, identity: String) {
        let cell = match slot {
            Slot::MainImage => &mut self.main_image,
            Slot::PromotionalImage => &mut self.promotional_image,
            _ => return,
        };
        if cell.is_none() {
            *cell = Some(identity);
        }
    }

    /// Read a single-valued slot
    pub fn get(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::MainImage => self.main_image.as_deref(),
            Slot::PromotionalImage => self.promotional_image.as_deref(),
            _ => None,
        }
    }

    /// Append identities to a multi-valued slot, preserving order
    pub fn put_all(&mut self, slot: Slot, identities: Vec<String>) {
        match slot {
            Slot::LeadImages => self.lead_images.extend(identities),
            Slot::Embeds => self.embeds.extend(identities),
            _ => {}
        }
    }

    /// Read a multi-valued slot in insertion order
    pub fn get_all(&self, slot: Slot) -> &[String] {
        match slot {
            Slot::LeadImages => &self.lead_images,
            Slot::Embeds => &self.embeds,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.main_image.is_none()
            && self.promotional_image.is_none()
            && self.lead_images.is_empty()
            && self.embeds.is_empty()
    }

    /// Flatten every slot into one combined fetch list
    ///
    /// Cross-slot ordering is not part of the contract; callers treat the
    /// result as a request set.
    pub fn to_batch(&self) -> Vec<String> {
        let mut batch = Vec::new();
        batch.extend(self.main_image.iter().cloned());
        batch.extend(self.promotional_image.iter().cloned());
        batch.extend(self.lead_images.iter().cloned());
        batch.extend(self.embeds.iter().cloned());
        batch
    }
}
