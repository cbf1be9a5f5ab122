pub use orar_models::notifications::{
    NewNotification, Notification, NotificationFilterParams, NotificationPayload,
};
