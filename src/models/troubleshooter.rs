//! Troubleshooter categories, steps, comments and attachments.

use crate::entity::Attr;
use crate::registry::{FieldDef, Parent, Scalar};

use super::AttachmentContents;

crate::entity! {
    /// A troubleshooter category.
    pub struct TroubleshooterCategory {
        controller: "/Troubleshooter/Category",
        tag: "troubleshootercategory",
        list: None,
        identifier: ID,
        parent: None,
        label: TITLE,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        STAFFID => FieldDef::int("staffid"),
        STAFFNAME => FieldDef::string("staffname"),
        TITLE => FieldDef::string("title"),
        DESCRIPTION => FieldDef::string("description"),
        CATEGORYTYPE => FieldDef::int("categorytype"),
        DISPLAYORDER => FieldDef::int("displayorder"),
        VIEWS => FieldDef::int("views"),
        USERVISIBILITYCUSTOM => FieldDef::boolean("uservisibilitycustom"),
        USERGROUPIDLIST => FieldDef::list("usergroupidlist", "usergroupid", Scalar::Int),
        STAFFVISIBILITYCUSTOM => FieldDef::boolean("staffvisibilitycustom"),
        STAFFGROUPIDLIST => FieldDef::list("staffgroupidlist", "staffgroupid", Scalar::Int),
    }
    add: [
        TITLE, CATEGORYTYPE, STAFFID, DISPLAYORDER, DESCRIPTION, USERVISIBILITYCUSTOM,
        USERGROUPIDLIST, STAFFVISIBILITYCUSTOM, STAFFGROUPIDLIST,
    ], required: [TITLE, CATEGORYTYPE, STAFFID];
    save: [
        TITLE, CATEGORYTYPE, STAFFID, DISPLAYORDER, DESCRIPTION, USERVISIBILITYCUSTOM,
        USERGROUPIDLIST, STAFFVISIBILITYCUSTOM, STAFFGROUPIDLIST,
    ], required: [TITLE, CATEGORYTYPE, STAFFID];
}

crate::entity! {
    /// A step of a troubleshooter.
    ///
    /// Steps link to each other through `parentsteps` and `childsteps`. A
    /// step may redirect the user to ticket submission, prefilled from the
    /// `redirect*` and `ticket*` attributes.
    pub struct TroubleshooterStep {
        controller: "/Troubleshooter/Step",
        tag: "troubleshooterstep",
        list: None,
        identifier: ID,
        parent: None,
        label: SUBJECT,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        CATEGORYID => FieldDef::int("categoryid"),
        STAFFID => FieldDef::int("staffid"),
        STAFFNAME => FieldDef::string("staffname"),
        SUBJECT => FieldDef::string("subject"),
        EDITED => FieldDef::boolean("edited"),
        EDITEDSTAFFID => FieldDef::int("editedstaffid"),
        EDITEDSTAFFNAME => FieldDef::string("editedstaffname"),
        DISPLAYORDER => FieldDef::int("displayorder"),
        ALLOWCOMMENTS => FieldDef::boolean("allowcomments"),
        HASATTACHMENTS => FieldDef::boolean("hasattachments"),
        ATTACHMENTS => FieldDef::list("attachments", "attachment", Scalar::Int),
        PARENTSTEPS => FieldDef::list("parentsteps", "id", Scalar::Int),
        CHILDSTEPS => FieldDef::list("childsteps", "id", Scalar::Int),
        REDIRECTTICKETS => FieldDef::boolean("redirecttickets"),
        TICKETSUBJECT => FieldDef::string("ticketsubject"),
        REDIRECTDEPARTMENTID => FieldDef::int("redirectdepartmentid"),
        TICKETTYPEID => FieldDef::int("tickettypeid"),
        PRIORITYID => FieldDef::int("priorityid"),
        CONTENTS => FieldDef::string("contents"),
        ENABLETICKETREDIRECTION => FieldDef::boolean("enableticketredirection").unobserved(),
        TICKETPRIORITYID => FieldDef::int("ticketpriorityid").unobserved(),
        STEPSTATUS => FieldDef::int("stepstatus").unobserved(),
        PARENTSTEPIDLIST => FieldDef::list("parentstepidlist", "parentstepid", Scalar::Int)
            .unobserved(),
    }
    add: [
        CATEGORYID, SUBJECT, CONTENTS, STAFFID, DISPLAYORDER, ALLOWCOMMENTS,
        ENABLETICKETREDIRECTION, REDIRECTDEPARTMENTID, TICKETTYPEID, TICKETPRIORITYID,
        TICKETSUBJECT, STEPSTATUS, PARENTSTEPIDLIST,
    ], required: [CATEGORYID, SUBJECT, CONTENTS, STAFFID];
    save: [
        CATEGORYID, SUBJECT, CONTENTS, STAFFID, DISPLAYORDER, ALLOWCOMMENTS,
        ENABLETICKETREDIRECTION, REDIRECTDEPARTMENTID, TICKETTYPEID, TICKETPRIORITYID,
        TICKETSUBJECT, STEPSTATUS, PARENTSTEPIDLIST,
    ], required: [CATEGORYID, SUBJECT, CONTENTS, STAFFID];
}

crate::entity! {
    /// A comment on a troubleshooter step.
    pub struct TroubleshooterComment {
        controller: "/Troubleshooter/Comment",
        tag: "troubleshooterstepcomment",
        list: Some("ListAll"),
        identifier: ID,
        parent: Some(Parent { field: Self::TROUBLESHOOTERSTEPID.name(), in_path: false }),
        label: CONTENTS,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        TROUBLESHOOTERSTEPID => FieldDef::int("troubleshooterstepid"),
        CREATORTYPE => FieldDef::int("creatortype"),
        CREATORID => FieldDef::int("creatorid"),
        FULLNAME => FieldDef::string("fullname"),
        EMAIL => FieldDef::string("email"),
        IPADDRESS => FieldDef::string("ipaddress"),
        DATELINE => FieldDef::date("dateline"),
        PARENTCOMMENTID => FieldDef::int("parentcommentid"),
        COMMENTSTATUS => FieldDef::int("commentstatus"),
        USERAGENT => FieldDef::string("useragent"),
        REFERRER => FieldDef::string("referrer"),
        PARENTURL => FieldDef::string("parenturl"),
        CONTENTS => FieldDef::string("contents"),
    }
    add: [
        TROUBLESHOOTERSTEPID, CONTENTS, CREATORTYPE, CREATORID, FULLNAME, EMAIL,
        PARENTCOMMENTID,
    ], required: [TROUBLESHOOTERSTEPID, CONTENTS, CREATORTYPE];
    save: [
        TROUBLESHOOTERSTEPID, CONTENTS, CREATORTYPE, CREATORID, FULLNAME, EMAIL,
        PARENTCOMMENTID,
    ], required: [TROUBLESHOOTERSTEPID, CONTENTS, CREATORTYPE];
}

crate::entity! {
    /// A file attached to a troubleshooter step. Fetch and delete with
    /// `Key::within(step_id, attachment_id)`.
    pub struct TroubleshooterAttachment {
        controller: "/Troubleshooter/Attachment",
        tag: "troubleshooterattachment",
        list: Some("ListAll"),
        identifier: ID,
        parent: Some(Parent { field: Self::TROUBLESHOOTERSTEPID.name(), in_path: true }),
        label: FILENAME,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        TROUBLESHOOTERSTEPID => FieldDef::int("troubleshooterstepid"),
        FILENAME => FieldDef::string("filename"),
        FILESIZE => FieldDef::int("filesize"),
        FILETYPE => FieldDef::string("filetype"),
        DATELINE => FieldDef::date("dateline"),
        CONTENTS => FieldDef::string("contents"),
    }
    add: [TROUBLESHOOTERSTEPID, FILENAME, CONTENTS],
        required: [TROUBLESHOOTERSTEPID, FILENAME, CONTENTS];
    save: [], required: [];
}

impl AttachmentContents for TroubleshooterAttachment {
    const PAYLOAD: Attr<Self> = Self::CONTENTS;
}
