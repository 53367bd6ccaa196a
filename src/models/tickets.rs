//! Tickets, ticket notes and ticket attachments.

use crate::entity::{Attr, Entity};
use crate::error::KayakoError;
use crate::lifecycle::{Lifecycle, Scope};
use crate::registry::{FieldDef, Parent, Record};
use crate::transport::Transport;

use super::{exactly_one_of, identifier, AttachmentContents};

/// Path segment meaning "any" in a ticket listing.
const ANY: i64 = -1;

crate::entity! {
    /// A support ticket.
    ///
    /// Creating a ticket requires exactly one creator: `userid` for a ticket
    /// raised on behalf of a user, or `staffid` for one raised by staff.
    pub struct Ticket {
        controller: "/Tickets/Ticket",
        tag: "ticket",
        list: Some("ListAll"),
        identifier: ID,
        parent: None,
        label: SUBJECT,
        validate_add: Some(ticket_creator),
    }
    fields {
        ID => FieldDef::int("id"),
        DISPLAYID => FieldDef::string("displayid"),
        DEPARTMENTID => FieldDef::int("departmentid"),
        TICKETSTATUSID => FieldDef::int("ticketstatusid").tag("statusid"),
        TICKETPRIORITYID => FieldDef::int("ticketpriorityid").tag("priorityid"),
        TICKETTYPEID => FieldDef::int("tickettypeid").tag("typeid"),
        USERID => FieldDef::int("userid"),
        USERORGANIZATION => FieldDef::string("userorganization"),
        USERORGANIZATIONID => FieldDef::int("userorganizationid"),
        OWNERSTAFFID => FieldDef::int("ownerstaffid"),
        OWNERSTAFFNAME => FieldDef::string("ownerstaffname"),
        FULLNAME => FieldDef::string("fullname"),
        EMAIL => FieldDef::string("email"),
        LASTREPLIER => FieldDef::string("lastreplier"),
        SUBJECT => FieldDef::string("subject"),
        CREATIONTIME => FieldDef::date("creationtime"),
        LASTACTIVITY => FieldDef::date("lastactivity"),
        LASTSTAFFREPLY => FieldDef::date("laststaffreply"),
        LASTUSERREPLY => FieldDef::date("lastuserreply"),
        SLAPLANID => FieldDef::int("slaplanid"),
        NEXTREPLYDUE => FieldDef::date("nextreplydue"),
        RESOLUTIONDUE => FieldDef::date("resolutiondue"),
        REPLIES => FieldDef::int("replies"),
        IPADDRESS => FieldDef::string("ipaddress"),
        CREATOR => FieldDef::int("creator"),
        CREATIONMODE => FieldDef::int("creationmode"),
        CREATIONTYPE => FieldDef::int("creationtype"),
        ISESCALATED => FieldDef::boolean("isescalated"),
        ESCALATIONRULEID => FieldDef::int("escalationruleid"),
        TEMPLATEGROUPID => FieldDef::int("templategroupid"),
        TAGS => FieldDef::string("tags"),
        CONTENTS => FieldDef::string("contents").unobserved(),
        STAFFID => FieldDef::int("staffid").unobserved(),
        TYPE => FieldDef::string("type").unobserved(),
    }
    add: [
        SUBJECT, FULLNAME, EMAIL, CONTENTS, DEPARTMENTID, TICKETSTATUSID,
        TICKETPRIORITYID, TICKETTYPEID, USERID, STAFFID, OWNERSTAFFID, TYPE,
    ], required: [
        SUBJECT, FULLNAME, EMAIL, CONTENTS, DEPARTMENTID, TICKETSTATUSID,
        TICKETPRIORITYID, TICKETTYPEID,
    ];
    save: [
        SUBJECT, FULLNAME, EMAIL, DEPARTMENTID, TICKETSTATUSID, TICKETPRIORITYID,
        TICKETTYPEID, OWNERSTAFFID, USERID,
    ], required: [];
}

fn filter_segment(ids: &[i64]) -> String {
    if ids.is_empty() {
        return ANY.to_string();
    }
    ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",")
}

fn ticket_creator(record: &Record) -> Result<(), KayakoError> {
    exactly_one_of(record, Ticket::USERID.name(), Ticket::STAFFID.name())
}

impl Ticket {
    /// Scope for listing the tickets of a department, narrowed by statuses,
    /// owners and users. An empty filter matches any value.
    pub fn scope(department: i64, statuses: &[i64], owners: &[i64], users: &[i64]) -> Scope {
        Scope::new()
            .segment(department)
            .segment(filter_segment(statuses))
            .segment(filter_segment(owners))
            .segment(filter_segment(users))
    }

    /// Lists the notes of this ticket.
    pub async fn notes<T: Transport + ?Sized>(
        &self,
        transport: &T,
    ) -> Result<Vec<TicketNote>, KayakoError> {
        let id = identifier(self, "notes")?;
        TicketNote::get_all(transport, Scope::under(id)).await
    }

    /// Lists the attachments of this ticket.
    pub async fn attachments<T: Transport + ?Sized>(
        &self,
        transport: &T,
    ) -> Result<Vec<TicketAttachment>, KayakoError> {
        let id = identifier(self, "attachments")?;
        TicketAttachment::get_all(transport, Scope::under(id)).await
    }
}

crate::entity! {
    /// A note on a ticket. The note text is the element's own content.
    ///
    /// Creating a note requires exactly one author: `staffid` for a staff
    /// member or `fullname` for anyone else.
    pub struct TicketNote {
        controller: "/Tickets/TicketNote",
        tag: "note",
        list: Some("ListAll"),
        identifier: ID,
        parent: Some(Parent { field: Self::TICKETID.name(), in_path: true }),
        label: CONTENTS,
        validate_add: Some(note_author),
    }
    fields {
        ID => FieldDef::int("id"),
        TICKETID => FieldDef::int("ticketid"),
        TYPE => FieldDef::string("type"),
        NOTECOLOR => FieldDef::int("notecolor"),
        CREATORSTAFFID => FieldDef::int("creatorstaffid"),
        CREATORSTAFFNAME => FieldDef::string("creatorstaffname"),
        FORSTAFFID => FieldDef::int("forstaffid"),
        CREATIONDATE => FieldDef::date("creationdate"),
        CONTENTS => FieldDef::string("contents").text(),
        STAFFID => FieldDef::int("staffid").unobserved(),
        FULLNAME => FieldDef::string("fullname").unobserved(),
    }
    add: [TICKETID, CONTENTS, STAFFID, FULLNAME, FORSTAFFID, NOTECOLOR],
        required: [TICKETID, CONTENTS];
    save: [], required: [];
}

fn note_author(record: &Record) -> Result<(), KayakoError> {
    exactly_one_of(record, TicketNote::STAFFID.name(), TicketNote::FULLNAME.name())
}

crate::entity! {
    /// A file attached to a ticket post. Fetch and delete with
    /// `Key::within(ticket_id, attachment_id)`.
    pub struct TicketAttachment {
        controller: "/Tickets/TicketAttachment",
        tag: "attachment",
        list: Some("ListAll"),
        identifier: ID,
        parent: Some(Parent { field: Self::TICKETID.name(), in_path: true }),
        label: FILENAME,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        TICKETID => FieldDef::int("ticketid"),
        TICKETPOSTID => FieldDef::int("ticketpostid"),
        FILENAME => FieldDef::string("filename"),
        FILESIZE => FieldDef::int("filesize"),
        FILETYPE => FieldDef::string("filetype"),
        DATELINE => FieldDef::date("dateline"),
        CONTENTS => FieldDef::string("contents"),
    }
    add: [TICKETID, TICKETPOSTID, FILENAME, CONTENTS],
        required: [TICKETID, TICKETPOSTID, FILENAME, CONTENTS];
    save: [], required: [];
}

impl AttachmentContents for TicketAttachment {
    const PAYLOAD: Attr<Self> = Self::CONTENTS;
}

impl TicketAttachment {
    /// The parent ticket identifier, if known.
    pub fn ticket_id(&self) -> Option<i64> {
        self.attr(Self::TICKETID).as_int()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Key;
    use crate::models::testing::Canned;
    use crate::registry::Slot;
    use crate::transport::{Method, ParamValue};

    fn new_ticket() -> Ticket {
        let mut ticket = Ticket::new();
        ticket
            .set(Ticket::SUBJECT, "Printer on fire")
            .set(Ticket::FULLNAME, "Ann Example")
            .set(Ticket::EMAIL, "ann@example.com")
            .set(Ticket::CONTENTS, "Smoke everywhere")
            .set(Ticket::DEPARTMENTID, 1i64)
            .set(Ticket::TICKETSTATUSID, 1i64)
            .set(Ticket::TICKETPRIORITYID, 2i64)
            .set(Ticket::TICKETTYPEID, 1i64);
        ticket
    }

    const CREATED: &str = r#"<tickets><ticket id="42" flagtype="0">
        <displayid>ABC-123-4567</displayid><departmentid>1</departmentid>
        <statusid>1</statusid><priorityid>2</priorityid><typeid>1</typeid>
        <userid>7</userid><fullname>Ann Example</fullname><email>ann@example.com</email>
        <subject>Printer on fire</subject><creationtime>1300000000</creationtime>
        <lastactivity>0</lastactivity>
    </ticket></tickets>"#;

    #[tokio::test]
    async fn test_add_ticket_for_user() {
        let transport = Canned::new().respond(CREATED);
        let mut ticket = new_ticket();
        ticket.set(Ticket::USERID, 7i64);

        ticket.add(&transport).await.unwrap();

        let (path, method, params) = &transport.calls()[0];
        assert_eq!(path, "/Tickets/Ticket");
        assert_eq!(*method, Method::POST);
        assert_eq!(params["ticketstatusid"], ParamValue::Single("1".into()));
        assert!(!params.contains_key("staffid"));

        assert_eq!(ticket.id().as_int(), Some(42));
        assert_eq!(ticket.attr(Ticket::DISPLAYID).as_str(), Some("ABC-123-4567"));
        assert_eq!(ticket.attr(Ticket::TICKETPRIORITYID).as_int(), Some(2));
        assert!(ticket.attr(Ticket::LASTACTIVITY).is_null());
        assert_eq!(ticket.attr(Ticket::CONTENTS).as_str(), Some("Smoke everywhere"));
    }

    #[tokio::test]
    async fn test_add_ticket_requires_one_creator() {
        let transport = Canned::new();

        let mut ticket = new_ticket();
        let err = ticket.add(&transport).await.unwrap_err();
        assert!(matches!(
            err,
            KayakoError::MissingRequiredField { ref field, .. } if field == "userid or staffid"
        ));

        ticket.set(Ticket::USERID, 7i64).set(Ticket::STAFFID, 1i64);
        let err = ticket.add(&transport).await.unwrap_err();
        assert!(matches!(err, KayakoError::ConflictingFields { .. }));

        assert!(transport.calls().is_empty());
        assert!(ticket.id().is_unset());
    }

    #[tokio::test]
    async fn test_required_fields_checked_before_creator() {
        let transport = Canned::new();
        let mut ticket = Ticket::with_values([("subject", "Only a subject")]).unwrap();
        let err = ticket.add(&transport).await.unwrap_err();
        assert!(matches!(
            err,
            KayakoError::MissingRequiredField { ref field, .. } if field == "fullname"
        ));
    }

    #[tokio::test]
    async fn test_save_sends_only_update_fields() {
        let transport = Canned::new().respond(CREATED);
        let mut ticket = new_ticket();
        ticket.set(Ticket::ID, 42i64).set(Ticket::OWNERSTAFFID, Slot::Null);

        ticket.save(&transport).await.unwrap();

        let (path, method, params) = &transport.calls()[0];
        assert_eq!(path, "/Tickets/Ticket/42/");
        assert_eq!(*method, Method::PUT);
        assert!(!params.contains_key("contents"));
        assert_eq!(params["ownerstaffid"], ParamValue::Single(String::new()));
    }

    #[test]
    fn test_listing_scope() {
        let scope = Ticket::scope(3, &[], &[2], &[]);
        assert_eq!(scope.segments(), &["3", "-1", "2", "-1"]);

        let scope = Ticket::scope(3, &[1, 4], &[2, 5, 6], &[9]);
        assert_eq!(scope.segments(), &["3", "1,4", "2,5,6", "9"]);
    }

    #[tokio::test]
    async fn test_notes_hydrated_from_attributes_and_text() {
        let transport = Canned::new().respond(
            r#"<notes>
                <note type="ticket" id="1" ticketid="42" notecolor="1" creatorstaffid="3"
                    forstaffid="0" creatorstaffname="Bob" creationdate="1300000000">Called back</note>
                <note type="ticket" id="2" notecolor="2" creatorstaffid="3">Waiting</note>
            </notes>"#,
        );
        let mut ticket = Ticket::new();
        ticket.set(Ticket::ID, 42i64);

        let notes = ticket.notes(&transport).await.unwrap();

        assert_eq!(transport.calls()[0].0, "/Tickets/TicketNote/ListAll/42");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].attr(TicketNote::CONTENTS).as_str(), Some("Called back"));
        assert_eq!(notes[0].attr(TicketNote::CREATORSTAFFNAME).as_str(), Some("Bob"));
        assert_eq!(notes[1].attr(TicketNote::TICKETID).as_int(), Some(42));
        assert_eq!(notes[1].to_string(), "<TicketNote (2): Waiting>");
    }

    #[tokio::test]
    async fn test_note_requires_one_author() {
        let transport = Canned::new();
        let mut note = TicketNote::new();
        note.set(TicketNote::TICKETID, 42i64)
            .set(TicketNote::CONTENTS, "Hello");

        assert!(matches!(
            note.add(&transport).await,
            Err(KayakoError::MissingRequiredField { .. })
        ));
        note.set(TicketNote::STAFFID, 1i64).set(TicketNote::FULLNAME, "Ann");
        assert!(matches!(
            note.add(&transport).await,
            Err(KayakoError::ConflictingFields { first: "staffid", second: "fullname", .. })
        ));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_note_get_and_delete_route_through_ticket() {
        let transport = Canned::new()
            .respond(r#"<notes><note id="5" ticketid="42">Text</note></notes>"#);
        let note = TicketNote::get(&transport, Key::within(42i64, 5i64))
            .await
            .unwrap()
            .unwrap();
        note.delete(&transport).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].0, "/Tickets/TicketNote/42/5/");
        assert_eq!(calls[1].0, "/Tickets/TicketNote/42/5/");
        assert_eq!(calls[1].1, Method::DELETE);
    }

    #[tokio::test]
    async fn test_add_attachment() {
        let transport = Canned::new().respond(
            "<attachments><attachment>\
                <id>9</id><ticketid>42</ticketid><ticketpostid>100</ticketpostid>\
                <filename>log.txt</filename><filesize>5</filesize><filetype>text/plain</filetype>\
                <dateline>1300000000</dateline>\
            </attachment></attachments>",
        );
        let mut attachment = TicketAttachment::new();
        attachment
            .set(TicketAttachment::TICKETID, 42i64)
            .set(TicketAttachment::TICKETPOSTID, 100i64)
            .set(TicketAttachment::FILENAME, "log.txt");
        attachment.set_contents(b"hello");

        attachment.add(&transport).await.unwrap();

        let params = &transport.calls()[0].2;
        assert_eq!(params["contents"], ParamValue::Single("aGVsbG8=".into()));
        assert_eq!(attachment.id().as_int(), Some(9));
        assert_eq!(attachment.ticket_id(), Some(42));
        assert_eq!(attachment.attr(TicketAttachment::FILESIZE).as_int(), Some(5));
        assert_eq!(attachment.contents().unwrap(), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_attachment_missing_is_none() {
        let transport = Canned::new().respond("<attachments/>");
        let found = TicketAttachment::get(&transport, Key::within(42i64, 9i64))
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
