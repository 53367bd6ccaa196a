//! Knowledgebase categories, articles, comments and attachments.

use crate::entity::Attr;
use crate::registry::{FieldDef, Parent, Scalar};

use super::AttachmentContents;

crate::entity! {
    /// A knowledgebase category. Listings accept
    /// [`Scope::page`](crate::lifecycle::Scope::page).
    pub struct KnowledgebaseCategory {
        controller: "/Knowledgebase/Category",
        tag: "kbcategory",
        list: Some("ListAll"),
        identifier: ID,
        parent: None,
        label: TITLE,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        PARENTKBCATEGORYID => FieldDef::int("parentkbcategoryid"),
        STAFFID => FieldDef::int("staffid"),
        TITLE => FieldDef::string("title"),
        TOTALARTICLES => FieldDef::int("totalarticles"),
        CATEGORYTYPE => FieldDef::int("categorytype"),
        DISPLAYORDER => FieldDef::int("displayorder"),
        ARTICLESORTORDER => FieldDef::int("articlesortorder"),
        ALLOWCOMMENTS => FieldDef::boolean("allowcomments"),
        ALLOWRATING => FieldDef::boolean("allowrating"),
        ISPUBLISHED => FieldDef::boolean("ispublished"),
        USERVISIBILITYCUSTOM => FieldDef::boolean("uservisibilitycustom"),
        USERGROUPIDLIST => FieldDef::list("usergroupidlist", "usergroupid", Scalar::Int),
        STAFFVISIBILITYCUSTOM => FieldDef::boolean("staffvisibilitycustom"),
        STAFFGROUPIDLIST => FieldDef::list("staffgroupidlist", "staffgroupid", Scalar::Int),
    }
    add: [
        TITLE, CATEGORYTYPE, PARENTKBCATEGORYID, DISPLAYORDER, ARTICLESORTORDER,
        ALLOWCOMMENTS, ALLOWRATING, ISPUBLISHED, USERVISIBILITYCUSTOM,
        USERGROUPIDLIST, STAFFVISIBILITYCUSTOM, STAFFGROUPIDLIST, STAFFID,
    ], required: [TITLE, CATEGORYTYPE];
    save: [
        TITLE, CATEGORYTYPE, PARENTKBCATEGORYID, DISPLAYORDER, ARTICLESORTORDER,
        ALLOWCOMMENTS, ALLOWRATING, ISPUBLISHED, USERVISIBILITYCUSTOM,
        USERGROUPIDLIST, STAFFVISIBILITYCUSTOM, STAFFGROUPIDLIST, STAFFID,
    ], required: [TITLE, CATEGORYTYPE];
}

crate::entity! {
    /// A knowledgebase article.
    ///
    /// List the articles of one category with
    /// `Scope::under(category_id).page(count, start)`. `categoryid` is write
    /// only and may hold a single identifier or a list; the categories an
    /// article belongs to are reported in `categories`.
    pub struct KnowledgebaseArticle {
        controller: "/Knowledgebase/Article",
        tag: "kbarticle",
        list: Some("ListAll"),
        identifier: ID,
        parent: None,
        label: SUBJECT,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id").tag("kbarticleid"),
        KBARTICLEID => FieldDef::int("kbarticleid"),
        CONTENTS => FieldDef::string("contents"),
        CONTENTSTEXT => FieldDef::string("contentstext").tag("contentext"),
        CATEGORIES => FieldDef::list("categories", "categoryid", Scalar::Int),
        CREATOR => FieldDef::int("creator"),
        CREATORID => FieldDef::int("creatorid"),
        AUTHOR => FieldDef::string("author"),
        EMAIL => FieldDef::string("email"),
        SUBJECT => FieldDef::string("subject"),
        ISEDITED => FieldDef::boolean("isedited"),
        EDITEDDATELINE => FieldDef::date("editeddateline"),
        EDITEDSTAFFID => FieldDef::int("editedstaffid"),
        VIEWS => FieldDef::int("views"),
        ISFEATURED => FieldDef::boolean("isfeatured"),
        ALLOWCOMMENTS => FieldDef::boolean("allowcomments"),
        TOTALCOMMENTS => FieldDef::int("totalcomments"),
        HASATTACHMENTS => FieldDef::boolean("hasattachments"),
        ATTACHMENTS => FieldDef::list("attachments", "attachment", Scalar::Int).keyed("id"),
        DATELINE => FieldDef::date("dateline"),
        ARTICLESTATUS => FieldDef::int("articlestatus"),
        ARTICLERATING => FieldDef::string("articlerating"),
        RATINGHITS => FieldDef::int("ratinghits"),
        RATINGCOUNT => FieldDef::int("ratingcount"),
        CATEGORYID => FieldDef::int("categoryid").unobserved(),
    }
    add: [SUBJECT, CONTENTS, CREATORID, ARTICLESTATUS, ISFEATURED, ALLOWCOMMENTS, CATEGORYID],
        required: [SUBJECT, CONTENTS, CREATORID];
    save: [SUBJECT, CONTENTS, CREATORID, ARTICLESTATUS, ISFEATURED, ALLOWCOMMENTS, CATEGORYID],
        required: [SUBJECT, CONTENTS, CREATORID];
}

crate::entity! {
    /// A comment on a knowledgebase article.
    pub struct KnowledgebaseComment {
        controller: "/Knowledgebase/Comment",
        tag: "kbarticlecomment",
        list: Some("ListAll"),
        identifier: ID,
        parent: Some(Parent { field: Self::KNOWLEDGEBASEARTICLEID.name(), in_path: false }),
        label: CONTENTS,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        KNOWLEDGEBASEARTICLEID => FieldDef::int("knowledgebasearticleid").tag("kbarticleid"),
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
        KNOWLEDGEBASEARTICLEID, CONTENTS, CREATORTYPE, CREATORID, FULLNAME, EMAIL,
        PARENTCOMMENTID,
    ], required: [KNOWLEDGEBASEARTICLEID, CONTENTS, CREATORTYPE];
    save: [], required: [];
}

crate::entity! {
    /// A file attached to a knowledgebase article. Fetch and delete with
    /// `Key::within(article_id, attachment_id)`.
    pub struct KnowledgebaseAttachment {
        controller: "/Knowledgebase/Attachment",
        tag: "kbattachment",
        list: Some("ListAll"),
        identifier: ID,
        parent: Some(Parent { field: Self::KBARTICLEID.name(), in_path: true }),
        label: FILENAME,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        KBARTICLEID => FieldDef::int("kbarticleid"),
        FILENAME => FieldDef::string("filename"),
        FILESIZE => FieldDef::int("filesize"),
        FILETYPE => FieldDef::string("filetype"),
        DATELINE => FieldDef::date("dateline"),
        CONTENTS => FieldDef::string("contents"),
    }
    add: [KBARTICLEID, FILENAME, CONTENTS], required: [KBARTICLEID, FILENAME, CONTENTS];
    save: [], required: [];
}

impl AttachmentContents for KnowledgebaseAttachment {
    const PAYLOAD: Attr<Self> = Self::CONTENTS;
}
