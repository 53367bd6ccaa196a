//! News categories, items, comments and subscribers.

use crate::registry::{FieldDef, Parent, Scalar};

crate::entity! {
    /// A news category. Listings accept [`Scope::page`](crate::lifecycle::Scope::page).
    pub struct NewsCategory {
        controller: "/News/Category",
        tag: "newscategory",
        list: Some("ListAll"),
        identifier: ID,
        parent: None,
        label: TITLE,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        TITLE => FieldDef::string("title"),
        NEWSITEMCOUNT => FieldDef::int("newsitemcount"),
        VISIBILITYTYPE => FieldDef::string("visibilitytype"),
    }
    add: [TITLE, VISIBILITYTYPE], required: [TITLE, VISIBILITYTYPE];
    save: [TITLE, VISIBILITYTYPE], required: [TITLE, VISIBILITYTYPE];
}

crate::entity! {
    /// A news item. List the items of one category with
    /// `Scope::under(category_id)`.
    pub struct NewsItem {
        controller: "/News/NewsItem",
        tag: "newsitem",
        list: Some("ListAll"),
        identifier: ID,
        parent: None,
        label: SUBJECT,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        STAFFID => FieldDef::int("staffid"),
        NEWSTYPE => FieldDef::int("newstype"),
        NEWSSTATUS => FieldDef::int("newsstatus"),
        AUTHOR => FieldDef::string("author"),
        EMAIL => FieldDef::string("email"),
        SUBJECT => FieldDef::string("subject"),
        EMAILSUBJECT => FieldDef::string("emailsubject"),
        DATELINE => FieldDef::date("dateline"),
        EXPIRY => FieldDef::string("expiry"),
        ISSYNCED => FieldDef::boolean("issynced"),
        TOTALCOMMENTS => FieldDef::int("totalcomments"),
        USERVISIBILITYCUSTOM => FieldDef::boolean("uservisibilitycustom"),
        USERGROUPIDLIST => FieldDef::list("usergroupidlist", "usergroupid", Scalar::Int),
        STAFFVISIBILITYCUSTOM => FieldDef::boolean("staffvisibilitycustom"),
        STAFFGROUPIDLIST => FieldDef::list("staffgroupidlist", "staffgroupid", Scalar::Int),
        ALLOWCOMMENTS => FieldDef::boolean("allowcomments"),
        CONTENTS => FieldDef::string("contents"),
        CATEGORIES => FieldDef::list("categories", "categoryid", Scalar::Int),
        FROMNAME => FieldDef::string("fromname").unobserved(),
        CUSTOMEMAILSUBJECT => FieldDef::string("customemailsubject").unobserved(),
        SENDEMAIL => FieldDef::boolean("sendemail").unobserved(),
        NEWSCATEGORYIDLIST => FieldDef::list("newscategoryidlist", "newscategoryid", Scalar::Int)
            .unobserved(),
    }
    add: [
        SUBJECT, CONTENTS, STAFFID, NEWSTYPE, NEWSSTATUS, FROMNAME, EMAIL,
        CUSTOMEMAILSUBJECT, SENDEMAIL, ALLOWCOMMENTS, USERVISIBILITYCUSTOM,
        USERGROUPIDLIST, STAFFVISIBILITYCUSTOM, STAFFGROUPIDLIST, EXPIRY,
        NEWSCATEGORYIDLIST,
    ], required: [SUBJECT, CONTENTS, STAFFID];
    save: [
        SUBJECT, CONTENTS, STAFFID, NEWSTYPE, NEWSSTATUS, FROMNAME, EMAIL,
        CUSTOMEMAILSUBJECT, SENDEMAIL, ALLOWCOMMENTS, USERVISIBILITYCUSTOM,
        USERGROUPIDLIST, STAFFVISIBILITYCUSTOM, STAFFGROUPIDLIST, EXPIRY,
        NEWSCATEGORYIDLIST,
    ], required: [SUBJECT, CONTENTS, STAFFID];
}

crate::entity! {
    /// A comment on a news item.
    pub struct NewsComment {
        controller: "/News/Comment",
        tag: "newsitemcomment",
        list: Some("ListAll"),
        identifier: ID,
        parent: Some(Parent { field: Self::NEWSITEMID.name(), in_path: false }),
        label: CONTENTS,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        NEWSITEMID => FieldDef::int("newsitemid"),
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
    add: [NEWSITEMID, CONTENTS, CREATORTYPE, CREATORID, FULLNAME, EMAIL, PARENTCOMMENTID],
        required: [NEWSITEMID, CONTENTS, CREATORTYPE];
    save: [NEWSITEMID, CONTENTS, CREATORTYPE, CREATORID, FULLNAME, EMAIL, PARENTCOMMENTID],
        required: [NEWSITEMID, CONTENTS, CREATORTYPE];
}

crate::entity! {
    /// A news subscriber.
    pub struct NewsSubscriber {
        controller: "/News/Subscriber",
        tag: "newssubscriber",
        list: None,
        identifier: ID,
        parent: None,
        label: EMAIL,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        TGROUPID => FieldDef::int("tgroupid"),
        USERID => FieldDef::int("userid"),
        EMAIL => FieldDef::string("email"),
        ISVALIDATED => FieldDef::boolean("isvalidated"),
        USERGROUPID => FieldDef::int("usergroupid"),
    }
    add: [ISVALIDATED, EMAIL], required: [EMAIL];
    save: [ISVALIDATED, EMAIL], required: [EMAIL];
}
