//! Region label to color mapping.
//!
//! A [`LabelTable`] is owned by a single import task. Labels are inserted
//! first, then [`LabelTable::generate_colors`] assigns one evenly spaced hue
//! per label in insertion order.

use crate::color::Color;

/// Region label as carried by the scene payload.
pub type Label = i32;

/// Ordered set of unique labels with one color per label.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: Vec<Label>,
    colors: Vec<Color>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `label` unless it is already present.
    pub fn add_label(&mut self, label: Label) {
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    /// Insert every label of `labels`, skipping duplicates.
    pub fn add_labels(&mut self, labels: &[Label]) {
        for &label in labels {
            self.add_label(label);
        }
    }

    /// Recompute the color of every label from its insertion index.
    ///
    /// The whole table is regenerated, so call this once after a batch of
    /// insertions rather than after each one.
    pub fn generate_colors(&mut self) {
        let count = self.labels.len();
        log::trace!("Regenerating colors for {count} labels");
        self.colors.clear();
        self.colors.extend((0..count).map(|i| {
            let hue = 360.0 * i as f32 / count as f32;
            Color::from_hsv(hue, 1.0, 1.0)
        }));
    }

    /// Color of a previously inserted label.
    ///
    /// Returns `None` if the label was never inserted, or if colors have not
    /// been regenerated since it was.
    pub fn color(&self, label: Label) -> Option<Color> {
        let index = self.labels.iter().position(|&l| l == label)?;
        self.colors.get(index).copied()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        self.colors.clear();
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(&[])]
    #[case::unique(&[1, 2, 3])]
    #[case::duplicates(&[4, 4, 1, 4, 1, 9])]
    #[case::negative(&[-1, 0, -1, 7])]
    fn unique_labels_all_get_colors(#[case] input: &[Label]) {
        let mut table = LabelTable::new();
        for &label in input {
            table.add_label(label);
        }
        table.generate_colors();

        let mut unique = input.to_vec();
        unique.sort_unstable();
        unique.dedup();

        assert_eq!(table.len(), unique.len());
        assert_eq!(table.labels().len(), table.colors().len());
        for &label in input {
            assert!(table.color(label).is_some(), "label {label} has no color");
        }
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut table = LabelTable::new();
        table.add_labels(&[5, 3, 5, 1]);
        assert_eq!(table.labels(), &[5, 3, 1]);
    }

    #[test]
    fn colors_are_evenly_spaced_hues() {
        let mut table = LabelTable::new();
        table.add_labels(&[10, 20, 30, 40]);
        table.generate_colors();

        let hues: Vec<f32> = table.colors().iter().map(Color::hue).collect();
        for (hue, expected) in hues.iter().zip([0.0, 90.0, 180.0, 270.0]) {
            assert!((hue - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn unknown_label_has_no_color() {
        let mut table = LabelTable::new();
        table.add_label(1);
        table.generate_colors();
        assert!(table.color(2).is_none());
    }

    #[test]
    fn insert_after_generation_needs_regeneration() {
        let mut table = LabelTable::new();
        table.add_label(1);
        table.generate_colors();
        table.add_label(2);
        assert!(table.color(2).is_none());

        table.generate_colors();
        assert!(table.color(2).is_some());
    }

    #[test]
    fn clear_empties_table() {
        let mut table = LabelTable::new();
        table.add_labels(&[1, 2]);
        table.generate_colors();
        table.clear();
        assert!(table.is_empty());
        assert!(table.colors().is_empty());
    }
}
