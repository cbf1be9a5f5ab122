pub use orar_models::events::{
    BulkPublishResult, CreateEventDto, Event, EventFilterParams, EventWithGroups, MoveEventDto,
    RejectEventDto, UpdateEventDto,
};
