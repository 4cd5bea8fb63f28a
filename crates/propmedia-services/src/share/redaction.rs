//! Field-group redaction for anonymously shared properties.

use propmedia_core::models::{Property, RedactedProperty, ShareGrant};

/// Project a property through a grant's redaction flags.
///
/// Redaction happens server-side; withheld values never leave the process.
/// Three field groups exist: contact, price, and owner identity. A flag wipes
/// its whole group, never individual fields.
pub fn redact_property(property: Property, grant: &ShareGrant) -> RedactedProperty {
    let hide = |hidden: bool| if hidden { None } else { Some(()) };

    RedactedProperty {
        id: property.id,
        name: property.name,
        address: property.address,
        description: property.description,
        property_type: property.property_type,
        area_m2: property.area_m2,
        rooms: property.rooms,

        price: hide(grant.hide_price).and(property.price),
        sale_price: hide(grant.hide_price).and(property.sale_price),
        jeonse_deposit: hide(grant.hide_price).and(property.jeonse_deposit),
        monthly_deposit: hide(grant.hide_price).and(property.monthly_deposit),
        monthly_rent: hide(grant.hide_price).and(property.monthly_rent),

        manager_phone: hide(grant.hide_contact).and(property.manager_phone),
        co_broker_phone: hide(grant.hide_contact).and(property.co_broker_phone),

        owner_name: hide(grant.hide_owner_info).and(property.owner_name),
        owner_phone: hide(grant.hide_owner_info).and(property.owner_phone),
        owner_id_number: hide(grant.hide_owner_info).and(property.owner_id_number),
        contact_relationship: hide(grant.hide_owner_info).and(property.contact_relationship),
    }
}
