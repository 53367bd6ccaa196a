//! Custom field definitions. Read only.
//!
//! The helpdesk reports custom fields as XML attributes rather than child
//! elements; hydration reads both forms.

use crate::error::KayakoError;
use crate::lifecycle::{Lifecycle, Scope};
use crate::registry::{FieldDef, Parent};
use crate::transport::Transport;

use super::identifier;

crate::entity! {
    /// A custom field definition.
    pub struct CustomField {
        controller: "/Base/CustomField",
        tag: "customfield",
        list: None,
        identifier: ID,
        parent: None,
        label: FIELDNAME,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id").tag("customfieldid"),
        CUSTOMFIELDGROUPID => FieldDef::int("customfieldgroupid"),
        TITLE => FieldDef::string("title"),
        FIELDTYPE => FieldDef::int("fieldtype"),
        FIELDNAME => FieldDef::string("fieldname"),
        DEFAULTVALUE => FieldDef::string("defaultvalue"),
        ISREQUIRED => FieldDef::boolean("isrequired"),
        USEREDITABLE => FieldDef::boolean("usereditable"),
        STAFFEDITABLE => FieldDef::boolean("staffeditable"),
        REGEXPVALIDATE => FieldDef::string("regexpvalidate"),
        DISPLAYORDER => FieldDef::int("displayorder"),
        ENCRYPTINDB => FieldDef::boolean("encryptindb"),
        DESCRIPTION => FieldDef::string("description"),
    }
    add: [], required: [];
    save: [], required: [];
}

crate::entity! {
    /// One selectable option of a list-type custom field.
    pub struct CustomFieldOption {
        controller: "/Base/CustomField",
        tag: "option",
        list: Some("ListOptions"),
        identifier: ID,
        parent: Some(Parent { field: Self::CUSTOMFIELDID.name(), in_path: false }),
        label: OPTIONVALUE,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id").tag("customfieldoptionid"),
        CUSTOMFIELDID => FieldDef::int("customfieldid"),
        OPTIONVALUE => FieldDef::string("optionvalue"),
        DISPLAYORDER => FieldDef::int("displayorder"),
        ISSELECTED => FieldDef::boolean("isselected"),
        PARENTCUSTOMFIELDOPTIONID => FieldDef::int("parentcustomfieldoptionid"),
    }
    add: [], required: [];
    save: [], required: [];
}

impl CustomField {
    /// Lists the options of this field.
    ///
    /// # Errors
    ///
    /// Returns `KayakoError::MissingIdentifier` if this field has no
    /// identifier, and transport errors from the exchange.
    pub async fn options<T: Transport + ?Sized>(
        &self,
        transport: &T,
    ) -> Result<Vec<CustomFieldOption>, KayakoError> {
        let id = identifier(self, "options")?;
        CustomFieldOption::get_all(transport, Scope::under(id)).await
    }
}
