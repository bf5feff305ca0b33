//! CommandDispatcher - authorization plus the handler table.
//!
//! Every command passes one capability check before any core operation
//! runs. A rejected check has no effect.

mod caller;
mod command;
mod outcome;

pub use caller::Caller;
pub use command::{Command, UNSPECIFIED_TIME_SLOT};
pub use outcome::CommandOutcome;

use chrono::NaiveDate;
use std::sync::Arc;

use super::handlers::{
    MigrateChatCommand, MigrateChatHandler, NextDayAction, NextDayCommand, NextDayHandler,
    OverrideScheduleCommand, OverrideScheduleHandler, RidershipSummaryHandler, ScheduleView,
    ViewScheduleHandler,
};
use super::{
    BookingPolicy, Capability, CommandError, DailyOrchestrator, IntervalStore, OpenSession,
    SessionLifecycleController,
};
use crate::domain::chat::{ChatConfig, ChatType};
use crate::domain::foundation::ChatId;
use crate::domain::schedule::ScheduleError;
use crate::domain::session::Rider;
use crate::ports::{
    ChatDirectory, Notifier, RidershipLedger, ScheduleRepository, SessionRenderer, SessionStore,
};

/// Every collaborator the core needs.
#[derive(Clone)]
pub struct AppPorts {
    pub schedules: Arc<dyn ScheduleRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub ledger: Arc<dyn RidershipLedger>,
    pub directory: Arc<dyn ChatDirectory>,
    pub notifier: Arc<dyn Notifier>,
    pub renderer: Arc<dyn SessionRenderer>,
}

pub struct CommandDispatcher {
    directory: Arc<dyn ChatDirectory>,
    lifecycle: Arc<SessionLifecycleController>,
    orchestrator: DailyOrchestrator,
    override_schedule: OverrideScheduleHandler,
    view_schedule: ViewScheduleHandler,
    next_day: NextDayHandler,
    ridership: RidershipSummaryHandler,
    migrate_chat: MigrateChatHandler,
}

impl CommandDispatcher {
    pub fn new(ports: AppPorts, policy: BookingPolicy) -> Self {
        let intervals = Arc::new(IntervalStore::new(
            ports.schedules.clone(),
            ports.directory.clone(),
        ));
        let lifecycle = Arc::new(
            SessionLifecycleController::new(
                ports.sessions.clone(),
                ports.ledger.clone(),
                ports.directory.clone(),
                ports.notifier.clone(),
                ports.renderer.clone(),
            )
            .with_policy(policy),
        );

        Self {
            orchestrator: DailyOrchestrator::new(
                ports.directory.clone(),
                intervals.clone(),
                lifecycle.clone(),
                ports.notifier.clone(),
            ),
            override_schedule: OverrideScheduleHandler::new(intervals.clone()),
            view_schedule: ViewScheduleHandler::new(intervals.clone()),
            next_day: NextDayHandler::new(ports.directory.clone(), intervals, ports.notifier),
            ridership: RidershipSummaryHandler::new(ports.directory.clone(), ports.ledger),
            migrate_chat: MigrateChatHandler::new(ports.directory.clone(), lifecycle.clone()),
            directory: ports.directory,
            lifecycle,
        }
    }

    /// Checks the caller's capability, then runs the command.
    pub async fn dispatch(
        &self,
        caller: &Caller,
        command: Command,
        today: NaiveDate,
    ) -> Result<CommandOutcome, CommandError> {
        let chat = self
            .authorize(caller, command.required_capability())
            .await
            .inspect_err(|e| {
                tracing::debug!(
                    command = command.name(),
                    chat_id = ?caller.chat_id(),
                    "Command refused: {}",
                    e
                )
            })?;
        tracing::debug!(
            command = command.name(),
            chat_id = ?caller.chat_id(),
            "Dispatching command"
        );

        match command {
            Command::OpenSession { time_slot } => {
                let chat = require_chat(chat)?;
                let date = tomorrow(today)?;
                let session = self
                    .lifecycle
                    .open(OpenSession {
                        chat_id: chat.chat_id,
                        bus_id: None,
                        date,
                        time_slot: time_slot
                            .filter(|t| !t.trim().is_empty())
                            .unwrap_or_else(|| UNSPECIFIED_TIME_SLOT.to_string()),
                        capacity: chat.max_riders,
                    })
                    .await?;
                Ok(CommandOutcome::Session(session))
            }
            Command::Join { session_id } => {
                let (chat_id, rider) = member(caller)?;
                let update = self.lifecycle.join(chat_id, session_id, rider).await?;
                Ok(CommandOutcome::Roster(update))
            }
            Command::Leave { session_id } => {
                let (chat_id, rider) = member(caller)?;
                let update = self.lifecycle.leave(chat_id, session_id, rider.id()).await?;
                Ok(CommandOutcome::Roster(update))
            }
            Command::Close { book_id } => {
                Ok(CommandOutcome::Session(self.lifecycle.close(book_id).await?))
            }
            Command::Reopen { book_id } => {
                Ok(CommandOutcome::Session(self.lifecycle.reopen(book_id).await?))
            }
            Command::End { book_id } => Ok(CommandOutcome::Ended(self.lifecycle.end(book_id).await?)),
            Command::Cancel { book_id } => {
                Ok(CommandOutcome::Session(self.lifecycle.cancel(book_id).await?))
            }
            Command::SkipNextDay => self.shift_next_day(chat, NextDayAction::Skip, today).await,
            Command::UnskipNextDay => self.shift_next_day(chat, NextDayAction::Unskip, today).await,
            Command::OverrideSchedule {
                bus_id,
                ranges,
                status,
            } => {
                let result = self
                    .override_schedule
                    .handle(
                        OverrideScheduleCommand {
                            bus_id,
                            ranges,
                            status,
                        },
                        today,
                    )
                    .await?;
                Ok(CommandOutcome::Schedule(ScheduleView {
                    bus_id: result.bus_id,
                    entries: result.schedule,
                }))
            }
            Command::ViewSchedule { bus_id } => Ok(CommandOutcome::Schedule(
                self.view_schedule.handle(bus_id).await?,
            )),
            Command::RidershipSummary => {
                Ok(CommandOutcome::Ridership(self.ridership.handle().await?))
            }
            Command::DailyTrigger => Ok(CommandOutcome::Daily(
                self.orchestrator.run_daily(today).await?,
            )),
            Command::EndOfDayTrigger => Ok(CommandOutcome::EndOfDay(
                self.orchestrator.end_all_daily(today).await?,
            )),
            Command::MigrateChat { from, to } => Ok(CommandOutcome::Migrated(
                self.migrate_chat
                    .handle(MigrateChatCommand { from, to })
                    .await?,
            )),
        }
    }

    /// Resolves the caller's chat and checks it grants `required`.
    ///
    /// Returns the caller's chat settings when the check needed them.
    async fn authorize(
        &self,
        caller: &Caller,
        required: Capability,
    ) -> Result<Option<ChatConfig>, CommandError> {
        let forbidden = CommandError::Forbidden { required };
        match (required, caller) {
            (Capability::System, Caller::System) => Ok(None),
            (Capability::System, _) | (_, Caller::System) => Err(forbidden),
            (Capability::Member, Caller::Member { .. }) => Ok(None),
            (
                Capability::ServiceChatAdmin | Capability::AdminChatAdmin,
                Caller::Member {
                    chat_id,
                    is_chat_admin,
                    ..
                },
            ) => {
                if !*is_chat_admin {
                    return Err(forbidden);
                }
                let chat = self.chat(*chat_id).await?;
                let wanted = match required {
                    Capability::AdminChatAdmin => ChatType::Admin,
                    _ => ChatType::Service,
                };
                if chat.chat_type != wanted {
                    return Err(forbidden);
                }
                Ok(Some(chat))
            }
        }
    }

    async fn chat(&self, chat_id: ChatId) -> Result<ChatConfig, CommandError> {
        self.directory
            .get(chat_id)
            .await?
            .ok_or(CommandError::UnknownChat(chat_id))
    }

    async fn shift_next_day(
        &self,
        chat: Option<ChatConfig>,
        action: NextDayAction,
        today: NaiveDate,
    ) -> Result<CommandOutcome, CommandError> {
        let chat = require_chat(chat)?;
        let result = self
            .next_day
            .handle(
                NextDayCommand {
                    chat_id: chat.chat_id,
                    action,
                },
                today,
            )
            .await?;
        Ok(CommandOutcome::NextDay(result))
    }
}

fn require_chat(chat: Option<ChatConfig>) -> Result<ChatConfig, CommandError> {
    chat.ok_or(CommandError::Infrastructure(
        "chat settings missing after authorization".to_string(),
    ))
}

fn member(caller: &Caller) -> Result<(ChatId, Rider), CommandError> {
    match caller {
        Caller::Member { chat_id, rider, .. } => Ok((*chat_id, rider.clone())),
        Caller::System => Err(CommandError::Forbidden {
            required: Capability::Member,
        }),
    }
}

fn tomorrow(today: NaiveDate) -> Result<NaiveDate, CommandError> {
    Ok(today
        .succ_opt()
        .ok_or(ScheduleError::DateOutOfRange(today))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryChatDirectory, InMemoryRidershipLedger, InMemoryScheduleRepository,
        InMemorySessionStore,
    };
    use crate::adapters::notify::{RecordingNotifier, RecordingRenderer};
    use crate::domain::chat::Bus;
    use crate::domain::foundation::{BookId, BusId, RiderId, SessionState};
    use crate::domain::session::{RegistrationSession, SessionError};

    const SERVICE: ChatId = ChatId::new(-10);
    const ADMIN: ChatId = ChatId::new(-20);

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn rider(id: i64) -> Rider {
        Rider::new(RiderId::new(id), format!("rider{}", id))
    }

    async fn dispatcher() -> CommandDispatcher {
        let directory = Arc::new(InMemoryChatDirectory::new());
        directory
            .register(ChatConfig {
                chat_id: SERVICE,
                chat_type: ChatType::Service,
                max_riders: 3,
                pickup: "Camp".to_string(),
                destination: "Station".to_string(),
                buses: vec![Bus {
                    bus_id: BusId::new(1),
                    chat_id: SERVICE,
                    time: "0630".to_string(),
                }],
            })
            .await;
        directory
            .register(ChatConfig {
                chat_id: ADMIN,
                chat_type: ChatType::Admin,
                max_riders: 40,
                pickup: String::new(),
                destination: String::new(),
                buses: vec![],
            })
            .await;

        CommandDispatcher::new(
            AppPorts {
                schedules: Arc::new(InMemoryScheduleRepository::new()),
                sessions: Arc::new(InMemorySessionStore::new()),
                ledger: Arc::new(InMemoryRidershipLedger::new()),
                directory,
                notifier: Arc::new(RecordingNotifier::new()),
                renderer: Arc::new(RecordingRenderer::new()),
            },
            BookingPolicy::default(),
        )
    }

    async fn open(d: &CommandDispatcher) -> RegistrationSession {
        match d
            .dispatch(
                &Caller::admin(SERVICE, rider(100)),
                Command::OpenSession { time_slot: None },
                jan(13),
            )
            .await
            .unwrap()
        {
            CommandOutcome::Session(session) => session,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn service_admin_opens_for_tomorrow_with_default_slot() {
        let d = dispatcher().await;
        let session = open(&d).await;
        assert_eq!(session.date(), jan(14));
        assert_eq!(session.time_slot(), UNSPECIFIED_TIME_SLOT);
        assert_eq!(session.capacity(), 3);
    }

    #[tokio::test]
    async fn plain_member_cannot_open() {
        let d = dispatcher().await;
        let err = d
            .dispatch(
                &Caller::member(SERVICE, rider(1)),
                Command::OpenSession { time_slot: None },
                jan(13),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CommandError::Forbidden {
                required: Capability::ServiceChatAdmin
            }
        );
    }

    #[tokio::test]
    async fn service_admin_cannot_manage_bookings() {
        let d = dispatcher().await;
        let session = open(&d).await;
        let err = d
            .dispatch(
                &Caller::admin(SERVICE, rider(100)),
                Command::Close {
                    book_id: session.book_id(),
                },
                jan(13),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn admin_chat_manages_bookings_of_other_chats() {
        let d = dispatcher().await;
        let session = open(&d).await;
        let outcome = d
            .dispatch(
                &Caller::admin(ADMIN, rider(200)),
                Command::Close {
                    book_id: session.book_id(),
                },
                jan(13),
            )
            .await
            .unwrap();
        match outcome {
            CommandOutcome::Session(s) => assert_eq!(s.state(), SessionState::Closed),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn triggers_are_system_only() {
        let d = dispatcher().await;
        let err = d
            .dispatch(&Caller::admin(ADMIN, rider(200)), Command::DailyTrigger, jan(13))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Forbidden { .. }));

        assert!(d
            .dispatch(&Caller::System, Command::DailyTrigger, jan(13))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn system_cannot_join() {
        let d = dispatcher().await;
        let session = open(&d).await;
        let err = d
            .dispatch(
                &Caller::System,
                Command::Join {
                    session_id: session.id(),
                },
                jan(13),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn unknown_chat_admin_is_reported() {
        let d = dispatcher().await;
        let err = d
            .dispatch(
                &Caller::admin(ChatId::new(5), rider(1)),
                Command::SkipNextDay,
                jan(13),
            )
            .await
            .unwrap_err();
        assert_eq!(err, CommandError::UnknownChat(ChatId::new(5)));
    }

    #[tokio::test]
    async fn end_of_unknown_booking_is_unknown_session() {
        let d = dispatcher().await;
        let err = d
            .dispatch(
                &Caller::admin(ADMIN, rider(200)),
                Command::End {
                    book_id: BookId::new(999),
                },
                jan(13),
            )
            .await
            .unwrap_err();
        assert_eq!(err, CommandError::Session(SessionError::UnknownSession));
    }
}
