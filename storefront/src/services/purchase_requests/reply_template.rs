//! Deterministic reply suggested to the sales team for each purchase request.

use mart_core::MartConfigSnapshot;

pub const DEFAULT_CONTACT: &str = "+233 XX XXX XXXX";
pub const DEFAULT_SIGNATURE: &str = "Machines & More Sales Team";

/// What the reply talks about.
pub struct ReplyDetails<'a> {
    pub customer_name: &'a str,
    pub product_name: &'a str,
    pub phone_number: &'a str,
    pub location: &'a str,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct ReplyTemplate {
    pub contact_phone: String,
    pub contact_whatsapp: String,
    pub signature: String,
}

impl Default for ReplyTemplate {
    fn default() -> Self {
        Self {
            contact_phone: DEFAULT_CONTACT.to_string(),
            contact_whatsapp: DEFAULT_CONTACT.to_string(),
            signature: DEFAULT_SIGNATURE.to_string(),
        }
    }
}

impl ReplyTemplate {
    /// Reads `contact.phone`, `contact.whatsapp` and `sales.signature`.
    pub fn from_config(config: &MartConfigSnapshot) -> Self {
        Self {
            contact_phone: config.get_string_or("contact.phone", DEFAULT_CONTACT),
            contact_whatsapp: config.get_string_or("contact.whatsapp", DEFAULT_CONTACT),
            signature: config.get_string_or("sales.signature", DEFAULT_SIGNATURE),
        }
    }

    pub fn render(&self, details: &ReplyDetails<'_>) -> String {
        let notes = details
            .notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| format!(": \"{n}\""))
            .unwrap_or_default();

        format!(
            "Dear {customer},\n\
             \n\
             Thank you for your interest in the {product}!\n\
             \n\
             We've received your request to buy and our sales team will contact you shortly at {phone} to discuss:\n\
             - Product availability and condition\n\
             - Delivery options to {location}\n\
             - Payment terms and financing options\n\
             - Any specific requirements you mentioned{notes}\n\
             \n\
             Our verified sellers ensure quality and reliability. We offer Cash on Delivery within our service regions.\n\
             \n\
             For immediate assistance, please call us at {call} or WhatsApp {whatsapp}.\n\
             \n\
             Best regards,\n\
             {signature}",
            customer = details.customer_name,
            product = details.product_name,
            phone = details.phone_number,
            location = details.location,
            notes = notes,
            call = self.contact_phone,
            whatsapp = self.contact_whatsapp,
            signature = self.signature,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(notes: Option<&str>) -> ReplyDetails<'_> {
        ReplyDetails {
            customer_name: "Ama Mensah",
            product_name: "Honda Generator EU70iS",
            phone_number: "0241234567",
            location: "Kumasi",
            notes,
        }
    }

    #[test]
    fn mentions_customer_product_phone_and_location() {
        let reply = ReplyTemplate::default().render(&details(None));

        assert!(reply.starts_with("Dear Ama Mensah,\n\nThank you for your interest in the Honda Generator EU70iS!"));
        assert!(reply.contains("contact you shortly at 0241234567 to discuss:"));
        assert!(reply.contains("- Delivery options to Kumasi\n"));
        assert!(reply.contains("- Any specific requirements you mentioned\n"));
        assert!(reply.contains("Cash on Delivery"));
        assert!(reply.ends_with("Best regards,\nMachines & More Sales Team"));
    }

    #[test]
    fn quotes_notes_when_present() {
        let reply = ReplyTemplate::default().render(&details(Some("  need it by Friday ")));
        assert!(reply.contains("requirements you mentioned: \"need it by Friday\"\n"));

        let blank = ReplyTemplate::default().render(&details(Some("   ")));
        assert!(blank.contains("requirements you mentioned\n"));
    }

    #[test]
    fn contact_numbers_and_signature_come_from_config() {
        let template = ReplyTemplate {
            contact_phone: "+233 30 000 0000".into(),
            contact_whatsapp: "+233 55 000 0000".into(),
            signature: "Kumasi Desk".into(),
        };
        let reply = template.render(&details(None));
        assert!(reply.contains("call us at +233 30 000 0000 or WhatsApp +233 55 000 0000."));
        assert!(reply.ends_with("Kumasi Desk"));
    }

    #[test]
    fn same_input_same_reply() {
        let t = ReplyTemplate::default();
        assert_eq!(t.render(&details(Some("x"))), t.render(&details(Some("x"))));
    }
}
