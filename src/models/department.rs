//! Helpdesk departments.

use crate::registry::{FieldDef, Scalar};

crate::entity! {
    /// A ticket or live chat department.
    ///
    /// `type` is `public` or `private`; `module` is `tickets` or `livechat`
    /// and cannot be changed once the department exists.
    pub struct Department {
        controller: "/Base/Department",
        tag: "department",
        list: None,
        identifier: ID,
        parent: None,
        label: TITLE,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        TITLE => FieldDef::string("title"),
        TYPE => FieldDef::string("type"),
        MODULE => FieldDef::string("module"),
        DISPLAYORDER => FieldDef::int("displayorder"),
        PARENTDEPARTMENTID => FieldDef::int("parentdepartmentid"),
        USERVISIBILITYCUSTOM => FieldDef::boolean("uservisibilitycustom"),
        USERGROUPS => FieldDef::list("usergroups", "id", Scalar::Int),
        USERGROUPID => FieldDef::list("usergroupid", "usergroupid", Scalar::Int).unobserved(),
    }
    add: [TITLE, TYPE, MODULE, DISPLAYORDER, PARENTDEPARTMENTID, USERVISIBILITYCUSTOM, USERGROUPID],
        required: [TITLE, TYPE, MODULE];
    save: [TITLE, TYPE, DISPLAYORDER, PARENTDEPARTMENTID, USERVISIBILITYCUSTOM, USERGROUPID],
        required: [TITLE];
}
