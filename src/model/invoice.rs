use super::{de, impl_record, Resource, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, deserialize_with = "de::number", skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de::flag", skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<Timestamp>,
}

impl_record!(
    Invoice,
    Resource::Invoices,
    &[
        ("invoiceNumber", &["invoiceNo", "invoice_number", "number"]),
        ("customer", &["customerName", "client"]),
        ("serviceId", &["service_id", "service"]),
        ("amount", &["total", "totalAmount"]),
        ("paid", &["isPaid"]),
        ("issuedAt", &["date", "createdAt", "issueDate"]),
        ("dueDate", &["due_date", "paymentDue"]),
        ("paidAt", &["paidDate", "paymentDate"]),
    ]
);
