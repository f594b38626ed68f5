//! Destination addresses and their normalisation into request components.
//!
//! [`AddressFormatter`] turns a structured [`Address`] into the ordered list of
//! non-empty components sent as the distance matrix `destinations` parameter.
//! Country and state codes are expanded through a caller-supplied
//! [`RegionLookup`]; the core owns no locale data.

/// Fields of a structured address, in request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    /// First street line.
    AddressLine1,
    /// Second street line (unit, building, landmark).
    AddressLine2,
    /// City or town.
    City,
    /// State, province or region code.
    State,
    /// Postal code.
    Postcode,
    /// Country code.
    Country,
}

impl AddressField {
    /// All fields in request order.
    pub const ORDER: [Self; 6] = [
        Self::AddressLine1,
        Self::AddressLine2,
        Self::City,
        Self::State,
        Self::Postcode,
        Self::Country,
    ];
}

/// A customer destination as entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Address {
    /// First street line.
    pub address_line_1: Option<String>,
    /// Second street line.
    pub address_line_2: Option<String>,
    /// City or town.
    pub city: Option<String>,
    /// State code or name.
    pub state: Option<String>,
    /// Postal code.
    pub postcode: Option<String>,
    /// Country code or name.
    pub country: Option<String>,
}

impl Address {
    /// Return the trimmed, non-empty value stored for `field`.
    #[must_use]
    pub fn get(&self, field: AddressField) -> Option<&str> {
        let raw = match field {
            AddressField::AddressLine1 => &self.address_line_1,
            AddressField::AddressLine2 => &self.address_line_2,
            AddressField::City => &self.city,
            AddressField::State => &self.state,
            AddressField::Postcode => &self.postcode,
            AddressField::Country => &self.country,
        };
        raw.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Whether every field is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        AddressField::ORDER.iter().all(|field| self.get(*field).is_none())
    }
}

/// Expands country and state codes to display names.
pub trait RegionLookup {
    /// Return the display name for a country code.
    fn country_name(&self, country_code: &str) -> Option<String>;

    /// Return the display name for a state code within a country.
    fn state_name(&self, country_code: &str, state_code: &str) -> Option<String>;
}

impl<L: RegionLookup + ?Sized> RegionLookup for &L {
    fn country_name(&self, country_code: &str) -> Option<String> {
        (**self).country_name(country_code)
    }

    fn state_name(&self, country_code: &str, state_code: &str) -> Option<String> {
        (**self).state_name(country_code, state_code)
    }
}

/// Lookup that expands nothing; every code passes through verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRegionLookup;

impl RegionLookup for NoRegionLookup {
    fn country_name(&self, _country_code: &str) -> Option<String> {
        None
    }

    fn state_name(&self, _country_code: &str, _state_code: &str) -> Option<String> {
        None
    }
}

/// Which optional fields an abbreviated shipping estimate form collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalculatorPolicy {
    /// Keep the city field.
    pub enable_city: bool,
    /// Keep the postcode field.
    pub enable_postcode: bool,
}

/// Context of the request being priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatMode {
    /// Full checkout; every field is used.
    #[default]
    Checkout,
    /// Abbreviated estimate; street lines are always dropped and city and
    /// postcode only kept when the policy enables them.
    Calculator(CalculatorPolicy),
}

impl FormatMode {
    fn includes(self, field: AddressField) -> bool {
        match self {
            Self::Checkout => true,
            Self::Calculator(policy) => match field {
                AddressField::AddressLine1 | AddressField::AddressLine2 => false,
                AddressField::City => policy.enable_city,
                AddressField::Postcode => policy.enable_postcode,
                AddressField::State | AddressField::Country => true,
            },
        }
    }
}

/// Ordered, non-empty address components tagged with their source field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedAddress {
    parts: Vec<(AddressField, String)>,
}

impl FormattedAddress {
    /// Components in request order.
    #[must_use]
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(_, text)| text.as_str())
    }

    /// Whether no component survived formatting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether a component came from `field`.
    #[must_use]
    pub fn contains(&self, field: AddressField) -> bool {
        self.parts.iter().any(|(f, _)| *f == field)
    }

    /// Copy of this address with the component for `field` removed.
    #[must_use]
    pub fn without(&self, field: AddressField) -> Self {
        Self {
            parts: self
                .parts
                .iter()
                .filter(|(f, _)| *f != field)
                .cloned()
                .collect(),
        }
    }

    /// Join the components with commas for the request.
    #[must_use]
    pub fn to_param(&self) -> String {
        self.components().collect::<Vec<_>>().join(",")
    }
}

/// Normalises addresses using a region lookup.
///
/// # Examples
/// ```
/// use courier_core::{Address, AddressFormatter, FormatMode, NoRegionLookup};
///
/// let address = Address {
///     address_line_1: Some("Jl. Sudirman 1".into()),
///     city: Some("Jakarta".into()),
///     country: Some("ID".into()),
///     ..Address::default()
/// };
/// let formatted = AddressFormatter::new(&NoRegionLookup).format(&address, FormatMode::Checkout);
/// assert_eq!(formatted.to_param(), "Jl. Sudirman 1,Jakarta,ID");
/// ```
pub struct AddressFormatter<'a, L: ?Sized> {
    lookup: &'a L,
}

impl<'a, L: RegionLookup + ?Sized> AddressFormatter<'a, L> {
    /// Create a formatter backed by `lookup`.
    #[must_use]
    pub const fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Format `address` for `mode`.
    ///
    /// An empty result means the address cannot be geocoded.
    #[must_use]
    pub fn format(&self, address: &Address, mode: FormatMode) -> FormattedAddress {
        let country_code = address.get(AddressField::Country);
        let parts = AddressField::ORDER
            .into_iter()
            .filter(|field| mode.includes(*field))
            .filter_map(|field| {
                let value = address.get(field)?;
                let text = match field {
                    AddressField::Country => self
                        .lookup
                        .country_name(value)
                        .unwrap_or_else(|| value.to_owned()),
                    AddressField::State => country_code
                        .and_then(|country| self.lookup.state_name(country, value))
                        .unwrap_or_else(|| value.to_owned()),
                    _ => value.to_owned(),
                };
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| (field, trimmed.to_owned()))
            })
            .collect();
        FormattedAddress { parts }
    }
}
