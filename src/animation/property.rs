//! Animatable visual properties and partial property maps.
//!
//! A [`VisualState`] is a sparse map from [`Property`] to value. Tweens use
//! it for both their start and end states, and every element carries one as
//! its live style.

use bitflags::bitflags;

/// A single animatable visual property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    Opacity,
    /// Horizontal offset in logical pixels
    X,
    /// Vertical offset in logical pixels
    Y,
    Scale,
    /// Rotation in degrees
    Rotation,
}

impl Property {
    pub const ALL: [Property; 5] = [
        Property::Opacity,
        Property::X,
        Property::Y,
        Property::Scale,
        Property::Rotation,
    ];

    fn slot(self) -> usize {
        match self {
            Property::Opacity => 0,
            Property::X => 1,
            Property::Y => 2,
            Property::Scale => 3,
            Property::Rotation => 4,
        }
    }

    /// The value an element shows for this property when nothing was written.
    pub fn rest_value(self) -> f32 {
        match self {
            Property::Opacity | Property::Scale => 1.0,
            Property::X | Property::Y | Property::Rotation => 0.0,
        }
    }

    pub fn flag(self) -> PropertySet {
        match self {
            Property::Opacity => PropertySet::OPACITY,
            Property::X => PropertySet::X,
            Property::Y => PropertySet::Y,
            Property::Scale => PropertySet::SCALE,
            Property::Rotation => PropertySet::ROTATION,
        }
    }
}

bitflags! {
    /// Set of properties present in a [`VisualState`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PropertySet: u8 {
        const OPACITY = 1 << 0;
        const X = 1 << 1;
        const Y = 1 << 2;
        const SCALE = 1 << 3;
        const ROTATION = 1 << 4;
    }
}

/// Partial map of property values.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct VisualState {
    values: [f32; 5],
    present: PropertySet,
}

impl VisualState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opacity(self, value: f32) -> Self {
        self.with(Property::Opacity, value)
    }

    pub fn x(self, value: f32) -> Self {
        self.with(Property::X, value)
    }

    pub fn y(self, value: f32) -> Self {
        self.with(Property::Y, value)
    }

    pub fn scale(self, value: f32) -> Self {
        self.with(Property::Scale, value)
    }

    pub fn rotation(self, value: f32) -> Self {
        self.with(Property::Rotation, value)
    }

    pub fn with(mut self, property: Property, value: f32) -> Self {
        self.set(property, value);
        self
    }

    pub fn set(&mut self, property: Property, value: f32) {
        self.values[property.slot()] = value;
        self.present.insert(property.flag());
    }

    pub fn get(&self, property: Property) -> Option<f32> {
        self.present
            .contains(property.flag())
            .then(|| self.values[property.slot()])
    }

    /// Value of `property`, falling back to its rest value.
    pub fn resolved(&self, property: Property) -> f32 {
        self.get(property).unwrap_or_else(|| property.rest_value())
    }

    pub fn remove(&mut self, property: Property) {
        self.present.remove(property.flag());
        self.values[property.slot()] = 0.0;
    }

    pub fn properties(&self) -> PropertySet {
        self.present
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, f32)> + '_ {
        Property::ALL
            .into_iter()
            .filter_map(move |p| self.get(p).map(|v| (p, v)))
    }

    /// Write every property present in `other` into `self`.
    pub fn merge(&mut self, other: &VisualState) {
        for (property, value) in other.iter() {
            self.set(property, value);
        }
    }

    /// Snapshot of `self` restricted to the properties in `set`, using rest
    /// values for anything never written.
    pub fn sample(&self, set: PropertySet) -> VisualState {
        let mut out = VisualState::new();
        for property in Property::ALL {
            if set.contains(property.flag()) {
                out.set(property, self.resolved(property));
            }
        }
        out
    }

    /// Drop every property in `set`.
    pub fn without(mut self, set: PropertySet) -> Self {
        for property in Property::ALL {
            if set.contains(property.flag()) {
                self.remove(property);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_presence() {
        let state = VisualState::new().opacity(0.0).y(20.0);
        assert_eq!(state.properties(), PropertySet::OPACITY | PropertySet::Y);
        assert_eq!(state.get(Property::Y), Some(20.0));
        assert_eq!(state.get(Property::X), None);
    }

    #[test]
    fn test_resolved_uses_rest_values() {
        let state = VisualState::new();
        assert_eq!(state.resolved(Property::Opacity), 1.0);
        assert_eq!(state.resolved(Property::Scale), 1.0);
        assert_eq!(state.resolved(Property::Rotation), 0.0);
    }

    #[test]
    fn test_sample_and_without() {
        let live = VisualState::new().x(-50.0);
        let sample = live.sample(PropertySet::X | PropertySet::OPACITY);
        assert_eq!(sample.get(Property::X), Some(-50.0));
        assert_eq!(sample.get(Property::Opacity), Some(1.0));

        let trimmed = sample.without(PropertySet::X);
        assert_eq!(trimmed.properties(), PropertySet::OPACITY);
    }
}
