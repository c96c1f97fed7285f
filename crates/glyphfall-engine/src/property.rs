//! Animatable properties and sparse sets of property values.

/// A numeric property of an animation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    X,
    Y,
    Scale,
    Opacity,
}

impl Property {
    pub const ALL: [Property; 4] = [Property::X, Property::Y, Property::Scale, Property::Opacity];

    pub(crate) const fn index(self) -> usize {
        match self {
            Property::X => 0,
            Property::Y => 1,
            Property::Scale => 2,
            Property::Opacity => 3,
        }
    }

    /// Value a freshly created target starts with.
    pub const fn initial(self) -> f32 {
        match self {
            Property::X | Property::Y => 0.0,
            Property::Scale | Property::Opacity => 1.0,
        }
    }
}

/// Current values of every property on a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyValues([f32; 4]);

impl Default for PropertyValues {
    fn default() -> Self {
        let mut values = [0.0; 4];
        for property in Property::ALL {
            values[property.index()] = property.initial();
        }
        Self(values)
    }
}

impl PropertyValues {
    pub fn get(&self, property: Property) -> f32 {
        self.0[property.index()]
    }

    pub fn set(&mut self, property: Property, value: f32) {
        self.0[property.index()] = value;
    }
}

/// A sparse assignment of values to properties.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PropertySet([Option<f32>; 4]);

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, property: Property, value: f32) -> Self {
        self.insert(property, value);
        self
    }

    pub fn insert(&mut self, property: Property, value: f32) {
        self.0[property.index()] = Some(value);
    }

    pub fn remove(&mut self, property: Property) {
        self.0[property.index()] = None;
    }

    pub fn get(&self, property: Property) -> Option<f32> {
        self.0[property.index()]
    }

    pub fn contains(&self, property: Property) -> bool {
        self.get(property).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Properties with a value, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Property, f32)> + '_ {
        Property::ALL
            .into_iter()
            .filter_map(|property| self.get(property).map(|value| (property, value)))
    }
}
