//! Routing tables of the mail template categories.
//!
//! Every logical template maps to the `cmd` file the admin page edits. The
//! server lists the notification templates of blog, forum, tasks and files
//! in one shared group, so each of those categories ignores the other three.

use super::{CategoryInfo, FieldSet, Route, TemplateName};
use serde::Serialize;

const BLOG_NOTIFY: &str = "?action=admin_mailtemplates&cmd=blognotify.txt";
const FORUM_NOTIFY: &str = "?action=admin_mailtemplates&cmd=forumnotify.txt";
const TASK_NOTIFY: &str = "?action=admin_mailtemplates&cmd=tasknotification.txt";
const DATA_NOTIFY: &str = "?action=admin_mailtemplates&cmd=datanotify.txt";

macro_rules! mail_template_category {
    (
        $(#[$meta:meta])*
        $name:ident as $label:literal,
        fields: $fields:expr,
        ignore_hrefs: [$($ignore:expr),* $(,)?],
        { $($variant:ident => $key:literal, $cmd:literal;)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $key)]
                $variant,
            )+
        }

        impl TemplateName for $name {
            const CATEGORY: CategoryInfo = CategoryInfo {
                name: $label,
                fields: $fields,
                ignore_hrefs: &[$($ignore),*],
            };

            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn route(self) -> Route {
                match self {
                    $(Self::$variant => Route::mail($cmd),)+
                }
            }

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

mail_template_category! {
    /// Invoices, reminders and other accounting mails.
    AccountingTemplate as "accounting",
    fields: FieldSet::ALL,
    ignore_hrefs: [],
    {
        Invoice => "invoice", "rechnungpermail.txt";
        CreditNote => "creditNote", "gutschriftpermail.txt";
        PaymentReceived => "paymentReceived", "bezahltpermail.txt";
        DonationReceipt => "donationReceipt", "spendenquittungpermail.txt";
        FirstReminder => "firstReminder", "mahnungpermail.txt";
        SecondReminder => "secondReminder", "mahnungpermail2.txt";
        ThirdReminder => "thirdReminder", "mahnungpermail3.txt";
        InvoiceStatus => "invoiceStatus", "rechnungsstatus.txt";
        Offer => "offer", "angebotpermail.txt";
        OrderConfirmation => "orderConfirmation", "auftragsbestaetigunggpermail.txt";
        ReturnDebitNote => "returnDebitNote", "ruecklastschriftpermail.txt";
        SepaMandate => "sepaMandate", "sepamandatpermail.txt";
        Release => "release", "rechnungsfreigabe.txt";
    }
}

mail_template_category! {
    EventTemplate as "events",
    fields: FieldSet::ALL,
    ignore_hrefs: [],
    {
        MailToParticipants => "mailToParticipantsTemplate", "mailanteilnehmer.txt";
        Reminder => "reminder", "reminder.txt";
        RegistrationConfirmation => "registrationConfirmation", "anmeldung.txt";
        Cancellation => "cancellation", "absage.txt";
        Postponement => "postponement", "verschiebung.txt";
        Invitation => "invitation", "einladung.txt";
        InvitationSeries => "invitationSeries", "einladungserie.txt";
        RegistrationNotification => "registrationNotification", "anmeldebenachrichtigung.txt";
        Gleaning => "gleaning", "mailnachlese.txt";
        CertificateOfAttendance => "certificateOfAttendance", "teilnahmebescheinigung.txt";
        VoucherCode => "voucherCode", "vagutscheincode.txt";
    }
}

mail_template_category! {
    MemberTemplate as "members",
    fields: FieldSet::ALL,
    ignore_hrefs: [],
    {
        MailToMembers => "mailToMembersTemplate", "signatur.txt";
        LoginDetails => "loginDetails", "passwort.txt";
        PasswordReset => "passwordReset", "passwortreset.txt";
        Birthday => "birthday", "geburtstag.txt";
        Admission => "admission", "aufnahme.txt";
        Termination => "termination", "kuendigung.txt";
        Jubilee => "jubilee", "jubilaeum.txt";
        ProfileChange => "profileChange", "profilaenderung.txt";
    }
}

mail_template_category! {
    VoteTemplate as "votes",
    fields: FieldSet::ALL,
    ignore_hrefs: [],
    {
        Invitation => "invitation", "abstimmungseinladung.txt";
        Notification => "notification", "abstimmungsbenachrichtigung.txt";
        Result => "result", "abstimmungsergebnis.txt";
    }
}

mail_template_category! {
    ConventionTemplate as "conventions",
    fields: FieldSet::ALL,
    ignore_hrefs: [],
    {
        Agenda => "agenda", "versammlungagenda.txt";
        Protocol => "protocol", "versammlungprotokollmail.txt";
    }
}

mail_template_category! {
    ShopTemplate as "shop",
    fields: FieldSet::ALL,
    ignore_hrefs: [],
    {
        OrderInfo => "orderInfo", "shopkaufmail.txt";
        DeliveryNote => "deliveryNote", "lieferscheinpermail.txt";
        ReservationConfirmation => "reservationConfirmation", "vormerkungpermail.txt";
        GoodsDispatched => "goodsDispatched", "wareverschicktpermail.txt";
        DeliveryNoteToStorageLocation => "deliveryNoteToStorageLocation", "lieferscheinlagerortmail.txt";
        VoucherCode => "voucherCode", "shopgutscheincode.txt";
        ParticipantTickets => "participantTickets", "eventtickets.txt";
        Donation => "donation", "spendepermail.txt";
    }
}

mail_template_category! {
    /// Court and room booking mails.
    ReservationTemplate as "reservations",
    fields: FieldSet::ALL,
    ignore_hrefs: [],
    {
        BookingConfirmation => "bookingConfirmation", "platzbuchung.txt";
        ManualBookingConfirmation => "manualBookingConfirmation", "platzbuchungmanuell.txt";
        Cancellation => "cancellation", "platzbuchungstorno.txt";
        Release => "release", "platzbuchungfreigabe.txt";
        Notification => "notification", "platzbuchungnotify.txt";
        Reminder => "reminder", "platzbuchungerinnerung.txt";
    }
}

mail_template_category! {
    ForumTemplate as "forum",
    fields: FieldSet::ALL,
    ignore_hrefs: [BLOG_NOTIFY, TASK_NOTIFY, DATA_NOTIFY],
    {
        Notification => "notification", "forumnotify.txt";
    }
}

mail_template_category! {
    TaskTemplate as "tasks",
    fields: FieldSet::ALL,
    ignore_hrefs: [FORUM_NOTIFY, DATA_NOTIFY, BLOG_NOTIFY],
    {
        Reminder => "reminder", "tasknotification.txt";
    }
}

mail_template_category! {
    FileTemplate as "files",
    fields: FieldSet::ALL,
    ignore_hrefs: [FORUM_NOTIFY, TASK_NOTIFY, BLOG_NOTIFY],
    {
        Notification => "notification", "datanotify.txt";
    }
}

mail_template_category! {
    BlogTemplate as "blog",
    fields: FieldSet::ALL,
    ignore_hrefs: [FORUM_NOTIFY, TASK_NOTIFY, DATA_NOTIFY],
    {
        Notification => "notification", "blognotify.txt";
    }
}

mail_template_category! {
    DoubleOptInTemplate as "doubleOptIn",
    fields: FieldSet::ALL,
    ignore_hrefs: [],
    {
        ConsentToDataProtection => "consentToDataProtection", "einwilligung.txt";
    }
}

mail_template_category! {
    /// Header, footer and frame wrapped around every mail. These have no subject.
    LayoutTemplate as "layout",
    fields: FieldSet::BODY_ONLY,
    ignore_hrefs: [],
    {
        Header => "header", "mailheader.txt";
        Footer => "footer", "mailfooter.txt";
        Layout => "layout", "maillayout.txt";
    }
}
