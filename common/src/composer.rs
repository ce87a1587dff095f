// Notification composer

use crate::models::{NotificationData, NotificationMessage, NotificationPayload};
use crate::strategy::TitleStrategy;

/// Build the push for a newly seen item
///
/// The title comes from the family's strategy, the body is the item's own
/// title and the data carries what a client needs to open the notice.
pub fn build_payload(
    strategy: &dyn TitleStrategy,
    item: &NotificationPayload,
    category: &str,
) -> NotificationMessage {
    NotificationMessage {
        title: strategy.title(category),
        body: item.title.clone(),
        data: NotificationData {
            id: item.id.clone(),
            link: item.link.clone(),
            date: item.date.clone(),
        },
    }
}
