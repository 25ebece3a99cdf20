//! Product record model - the installed unit under management.
//!
//! A [`ProductRecord`] is one tracked device (DWLR, flow meter, ...) with its
//! subscription metadata. Records are only ever built through
//! [`ProductRecord::new`], which is where the renewal date gets derived, so a
//! stored record can never carry a renewal date that disagrees with its
//! activation date and validity period.

use crate::{
    core::renewal,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Opaque record identifier, assigned by the repository.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Wraps a raw id value.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether `raw` may be held by a record: positive and below `i64::MAX`,
    /// so the repository can always compute the id after it.
    #[must_use]
    pub const fn is_assignable(raw: i64) -> bool {
        raw >= 1 && raw < i64::MAX
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ProductId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .ok()
            .filter(|raw| Self::is_assignable(*raw))
            .map(Self)
            .ok_or_else(|| Error::InvalidValue {
                field: Field::Id.name(),
                value: s.to_string(),
            })
    }
}

/// Connectivity of the unit's modem.
///
/// Only `2G` and `4G` are recognized. Anything else that arrives through import
/// or persistence is kept verbatim in [`NetworkType::Unrecognized`] and is never
/// counted by analytics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NetworkType {
    /// "2G"
    TwoG,
    /// "4G"
    #[default]
    FourG,
    /// A legacy value outside the known set
    Unrecognized(String),
}

impl NetworkType {
    /// Display/serialized form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::TwoG => "2G",
            Self::FourG => "4G",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Whether this is one of the known variants.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for NetworkType {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "" => Self::default(),
            "2G" => Self::TwoG,
            "4G" => Self::FourG,
            _ => Self::Unrecognized(trimmed.to_string()),
        }
    }
}

impl From<NetworkType> for String {
    fn from(value: NetworkType) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for NetworkType {
    type Err = Error;

    /// Strict parse for user input: only the recognized values are accepted.
    fn from_str(s: &str) -> Result<Self> {
        match Self::from(s.to_string()) {
            Self::Unrecognized(raw) => Err(Error::InvalidValue {
                field: Field::NetworkType.name(),
                value: raw,
            }),
            known => Ok(known),
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SIM card provider. Same recognition rules as [`NetworkType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SimProvider {
    /// "VI"
    #[default]
    Vi,
    /// "AIRTEL"
    Airtel,
    /// A legacy value outside the known set
    Unrecognized(String),
}

impl SimProvider {
    /// Display/serialized form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Vi => "VI",
            Self::Airtel => "AIRTEL",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Whether this is one of the known variants.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for SimProvider {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "" => Self::default(),
            "VI" => Self::Vi,
            "AIRTEL" => Self::Airtel,
            _ => Self::Unrecognized(trimmed.to_string()),
        }
    }
}

impl From<SimProvider> for String {
    fn from(value: SimProvider) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for SimProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match Self::from(s.to_string()) {
            Self::Unrecognized(raw) => Err(Error::InvalidValue {
                field: Field::SimProvider.name(),
                value: raw,
            }),
            known => Ok(known),
        }
    }
}

impl fmt::Display for SimProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every field of a product record, in canonical column order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// `id`
    Id,
    /// `serialNumber`
    SerialNumber,
    /// `oemSerialNumber`
    OemSerialNumber,
    /// `productName`
    ProductName,
    /// `model`
    Model,
    /// `deviceUID`
    DeviceUid,
    /// `networkType`
    NetworkType,
    /// `cableLength`
    CableLength,
    /// `installationDate`
    InstallationDate,
    /// `activationDate`
    ActivationDate,
    /// `validityPeriod`
    ValidityPeriod,
    /// `renewalDate`
    RenewalDate,
    /// `simProvider`
    SimProvider,
    /// `simNumber`
    SimNumber,
    /// `channelPartner`
    ChannelPartner,
    /// `endUserName`
    EndUserName,
    /// `industryCategory`
    IndustryCategory,
}

impl Field {
    /// All fields in column order (used for export headers).
    pub const ALL: [Self; 17] = [
        Self::Id,
        Self::SerialNumber,
        Self::OemSerialNumber,
        Self::ProductName,
        Self::Model,
        Self::DeviceUid,
        Self::NetworkType,
        Self::CableLength,
        Self::InstallationDate,
        Self::ActivationDate,
        Self::ValidityPeriod,
        Self::RenewalDate,
        Self::SimProvider,
        Self::SimNumber,
        Self::ChannelPartner,
        Self::EndUserName,
        Self::IndustryCategory,
    ];

    /// The camelCase field name used in serialized records and spreadsheets.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::SerialNumber => "serialNumber",
            Self::OemSerialNumber => "oemSerialNumber",
            Self::ProductName => "productName",
            Self::Model => "model",
            Self::DeviceUid => "deviceUID",
            Self::NetworkType => "networkType",
            Self::CableLength => "cableLength",
            Self::InstallationDate => "installationDate",
            Self::ActivationDate => "activationDate",
            Self::ValidityPeriod => "validityPeriod",
            Self::RenewalDate => "renewalDate",
            Self::SimProvider => "simProvider",
            Self::SimNumber => "simNumber",
            Self::ChannelPartner => "channelPartner",
            Self::EndUserName => "endUserName",
            Self::IndustryCategory => "industryCategory",
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownColumn {
                column: s.to_string(),
            })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User-editable part of a record: everything except the id and the renewal date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductInput {
    /// Unit serial number, unique across records
    pub serial_number: String,
    /// Manufacturer's serial number
    pub oem_serial_number: Option<String>,
    /// Product name
    pub product_name: String,
    /// Model designation
    pub model: Option<String>,
    /// Device UID
    #[serde(rename = "deviceUID")]
    pub device_uid: String,
    /// Cellular network the unit reports over
    pub network_type: NetworkType,
    /// Installed cable length, free text
    pub cable_length: Option<String>,
    /// Date the unit was installed
    pub installation_date: Option<NaiveDate>,
    /// Date the subscription started
    pub activation_date: Option<NaiveDate>,
    /// Validity in whole months
    pub validity_period: Option<u32>,
    /// SIM network operator
    pub sim_provider: SimProvider,
    /// SIM installed in the unit
    pub sim_number: Option<String>,
    /// Partner who sold or installed the unit
    pub channel_partner: Option<String>,
    /// Client the unit belongs to
    pub end_user_name: String,
    /// Client's industry
    pub industry_category: String,
}

impl ProductInput {
    /// Trims every string and collapses blank optional strings to `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn text(value: String) -> String {
            value.trim().to_string()
        }
        fn optional(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            serial_number: text(self.serial_number),
            oem_serial_number: optional(self.oem_serial_number),
            product_name: text(self.product_name),
            model: optional(self.model),
            device_uid: text(self.device_uid),
            network_type: self.network_type,
            cable_length: optional(self.cable_length),
            installation_date: self.installation_date,
            activation_date: self.activation_date,
            validity_period: self.validity_period,
            sim_provider: self.sim_provider,
            sim_number: optional(self.sim_number),
            channel_partner: optional(self.channel_partner),
            end_user_name: text(self.end_user_name),
            industry_category: text(self.industry_category),
        }
    }

    /// Checks required fields, reporting every violation at once.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] naming each required field that is empty.
    /// `validityPeriod` counts as empty when absent or zero.
    pub fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();

        let required_text = [
            (Field::SerialNumber, &self.serial_number),
            (Field::ProductName, &self.product_name),
            (Field::DeviceUid, &self.device_uid),
            (Field::EndUserName, &self.end_user_name),
            (Field::IndustryCategory, &self.industry_category),
        ];
        for (field, value) in required_text {
            if value.trim().is_empty() {
                fields.push(field.name());
            }
        }
        if self.activation_date.is_none() {
            fields.push(Field::ActivationDate.name());
        }
        if !self.validity_period.is_some_and(|months| months > 0) {
            fields.push(Field::ValidityPeriod.name());
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { fields })
        }
    }
}

/// A record as it arrives in bulk (import or restore): the id may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRow {
    /// Existing id to preserve, if any
    pub id: Option<ProductId>,
    /// Field values
    pub input: ProductInput,
}

impl From<ProductRecord> for ProductRow {
    fn from(record: ProductRecord) -> Self {
        let id = Some(record.id);
        Self {
            id,
            input: record.into_input(),
        }
    }
}

/// One installed product unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Repository-assigned id
    pub id: ProductId,
    /// Unit serial number
    pub serial_number: String,
    /// Manufacturer's serial number
    #[serde(default)]
    pub oem_serial_number: Option<String>,
    /// Product name
    pub product_name: String,
    /// Model designation
    #[serde(default)]
    pub model: Option<String>,
    /// Device UID
    #[serde(rename = "deviceUID")]
    pub device_uid: String,
    /// Cellular network the unit reports over
    #[serde(default)]
    pub network_type: NetworkType,
    /// Installed cable length, free text
    #[serde(default)]
    pub cable_length: Option<String>,
    /// Date the unit was installed
    #[serde(default)]
    pub installation_date: Option<NaiveDate>,
    /// Date the subscription started
    #[serde(default)]
    pub activation_date: Option<NaiveDate>,
    /// Validity in whole months
    #[serde(default)]
    pub validity_period: Option<u32>,
    /// Derived from `activation_date` + `validity_period`; never set directly
    #[serde(default)]
    pub renewal_date: Option<NaiveDate>,
    /// SIM network operator
    #[serde(default)]
    pub sim_provider: SimProvider,
    /// SIM installed in the unit
    #[serde(default)]
    pub sim_number: Option<String>,
    /// Partner who sold or installed the unit
    #[serde(default)]
    pub channel_partner: Option<String>,
    /// Client the unit belongs to
    pub end_user_name: String,
    /// Client's industry
    pub industry_category: String,
}

impl ProductRecord {
    /// Builds a record from input, deriving the renewal date.
    #[must_use]
    pub fn new(id: ProductId, input: ProductInput) -> Self {
        let renewal_date = renewal::derive_renewal_date(input.activation_date, input.validity_period);

        Self {
            id,
            serial_number: input.serial_number,
            oem_serial_number: input.oem_serial_number,
            product_name: input.product_name,
            model: input.model,
            device_uid: input.device_uid,
            network_type: input.network_type,
            cable_length: input.cable_length,
            installation_date: input.installation_date,
            activation_date: input.activation_date,
            validity_period: input.validity_period,
            renewal_date,
            sim_provider: input.sim_provider,
            sim_number: input.sim_number,
            channel_partner: input.channel_partner,
            end_user_name: input.end_user_name,
            industry_category: input.industry_category,
        }
    }

    /// Strips the id and derived date, giving back the editable fields.
    #[must_use]
    pub fn into_input(self) -> ProductInput {
        ProductInput {
            serial_number: self.serial_number,
            oem_serial_number: self.oem_serial_number,
            product_name: self.product_name,
            model: self.model,
            device_uid: self.device_uid,
            network_type: self.network_type,
            cable_length: self.cable_length,
            installation_date: self.installation_date,
            activation_date: self.activation_date,
            validity_period: self.validity_period,
            sim_provider: self.sim_provider,
            sim_number: self.sim_number,
            channel_partner: self.channel_partner,
            end_user_name: self.end_user_name,
            industry_category: self.industry_category,
        }
    }

    /// String form of one field; absent values render as "".
    #[must_use]
    pub fn field_value(&self, field: Field) -> String {
        fn opt(value: Option<&String>) -> String {
            value.cloned().unwrap_or_default()
        }
        fn date(value: Option<NaiveDate>) -> String {
            value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
        }

        match field {
            Field::Id => self.id.to_string(),
            Field::SerialNumber => self.serial_number.clone(),
            Field::OemSerialNumber => opt(self.oem_serial_number.as_ref()),
            Field::ProductName => self.product_name.clone(),
            Field::Model => opt(self.model.as_ref()),
            Field::DeviceUid => self.device_uid.clone(),
            Field::NetworkType => self.network_type.to_string(),
            Field::CableLength => opt(self.cable_length.as_ref()),
            Field::InstallationDate => date(self.installation_date),
            Field::ActivationDate => date(self.activation_date),
            Field::ValidityPeriod => self
                .validity_period
                .map(|months| months.to_string())
                .unwrap_or_default(),
            Field::RenewalDate => date(self.renewal_date),
            Field::SimProvider => self.sim_provider.to_string(),
            Field::SimNumber => opt(self.sim_number.as_ref()),
            Field::ChannelPartner => opt(self.channel_partner.as_ref()),
            Field::EndUserName => self.end_user_name.clone(),
            Field::IndustryCategory => self.industry_category.clone(),
        }
    }
}
