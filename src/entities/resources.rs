use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Resource;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vendor {
    pub vendor_id: String,
    pub name: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewVendor {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Resource for Vendor {
    const COLLECTION: &'static str = "vendors";
    type Draft = NewVendor;

    fn id(&self) -> &str {
        &self.vendor_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryPartner {
    pub partner_id: String,
    pub name: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDeliveryPartner {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub is_available: bool,
}

impl Resource for DeliveryPartner {
    const COLLECTION: &'static str = "delivery-partners";
    type Draft = NewDeliveryPartner;

    fn id(&self) -> &str {
        &self.partner_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tenant {
    pub tenant_id: String,
    pub name: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTenant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

impl Resource for Tenant {
    const COLLECTION: &'static str = "tenants";
    type Draft = NewTenant;

    fn id(&self) -> &str {
        &self.tenant_id
    }
}
