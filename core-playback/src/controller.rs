//! # Playback Controller
//!
//! Sequential verse playback with pause-gated chaining.
//!
//! ## Overview
//!
//! A [`PlaybackController`] is a cheap, cloneable handle to an actor task
//! that exclusively owns the playback state, the [`MediaSource`] and the
//! single inter-verse pause timer. The task processes one input at a time:
//!
//! - transport commands sent by handles (each answered on a oneshot),
//! - media notifications (subscribed once, for the element's lifetime),
//! - completions of load and play futures it spawned,
//! - expiry of the pause timer,
//! - shutdown.
//!
//! Every input runs to completion before the next is looked at, so no
//! caller can observe a half-applied transition. After each input the task
//! publishes a [`PlayerSnapshot`] on a `watch` channel.
//!
//! ```text
//!  Idle ──set_sequence──> Loading ──ready──> Ready ──play──> Playing
//!                           ^  │                               │ ended
//!                           │  └──both candidates fail──> Error│
//!                           │                                  v
//!                           └──────pause elapsed────── InterVersePause
//!                                                   (last verse: Completed)
//! ```
//!
//! ## Stale results
//!
//! Every load carries a token from a monotonically increasing counter and
//! every play carries a transport generation. A completion whose tag is no
//! longer current is dropped, so a slow response for a verse the user has
//! already skipped past can never overwrite newer state.

use crate::clock::SessionClock;
use crate::config::{validate_pause_duration, PlayerConfig};
use crate::error::{PlaybackError, Result};
use crate::listener::{NoopListener, PlaybackListener, SessionSummary};
use crate::media::MediaSource;
use crate::resolver::{AudioCandidate, AudioResolver, AudioResourceResolver};
use crate::view::{self, PlayerPhase, PlayerSnapshot};
use bridge_traits::{Clock, MediaElement, MediaEvent, MediaReady, SystemClock, Verse};
use core_async::sync::broadcast::error::RecvError;
use core_async::sync::{broadcast, mpsc, oneshot, watch, CancellationToken};
use core_async::task::JoinHandle;
use core_async::time::{self, Duration, Sleep};
use core_runtime::logging::strip_url;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A verse is tried against at most this many candidates per load.
const MAX_LOAD_ATTEMPTS: usize = 2;

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    SetSequence { verses: Vec<Verse>, reply: Reply<()> },
    LoadVerse { index: usize, reply: Reply<()> },
    Play { reply: Reply<()> },
    Pause { reply: Reply<()> },
    Stop { reply: Reply<()> },
    NextAyah { reply: Reply<()> },
    PreviousAyah { reply: Reply<()> },
    Rewind { reply: Reply<()> },
    Forward { reply: Reply<()> },
    Seek { position: Duration, reply: Reply<()> },
    SkipToAyah { index: usize, reply: Reply<()> },
    RepeatCurrent { reply: Reply<()> },
    RepeatSession { reply: Reply<bool> },
    SetPauseDuration { secs: u32, reply: Reply<()> },
    SetAutoRepeat { enabled: bool, reply: Reply<()> },
}

enum Completion {
    Load {
        token: u64,
        attempt: usize,
        result: Result<MediaReady>,
    },
    Play {
        generation: u64,
        result: Result<()>,
    },
}

enum Input {
    Command(Command),
    Completion(Completion),
    Media(MediaEvent),
    PauseElapsed,
    Idle,
    Shutdown,
}

// ============================================================================
// Handle
// ============================================================================

/// Handle to a running playback controller.
///
/// Transport operations return `Err` on failure and also record the
/// failure's user-facing message in the snapshot's `error` field.
#[derive(Clone)]
pub struct PlaybackController {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<PlayerSnapshot>,
    session_clock: Arc<SessionClock>,
    shutdown: CancellationToken,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PlaybackController {
    /// Start configuring a controller that drives `media`.
    pub fn builder(media: Arc<dyn MediaElement>) -> ControllerBuilder {
        ControllerBuilder::new(media)
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| PlaybackError::ControllerClosed)?;
        response
            .await
            .map_err(|_| PlaybackError::ControllerClosed)?
    }

    /// Replace the active sequence, reset all state, restart the session
    /// clock and begin loading the first verse.
    ///
    /// Returns once the load has started; use [`wait_for`](Self::wait_for)
    /// to observe it finishing.
    pub async fn set_sequence(&self, verses: Vec<Verse>) -> Result<()> {
        self.request(|reply| Command::SetSequence { verses, reply })
            .await
    }

    /// Make `index` the active verse and load its audio, falling back to the
    /// alternative candidate when the primary fails.
    ///
    /// Resolves when the load finishes. A newer load started before then
    /// resolves this one with [`PlaybackError::Superseded`].
    pub async fn load_verse(&self, index: usize) -> Result<()> {
        self.request(|reply| Command::LoadVerse { index, reply })
            .await
    }

    /// Start playback of the loaded verse. Resolves once audio is running.
    pub async fn play(&self) -> Result<()> {
        self.request(|reply| Command::Play { reply }).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| Command::Pause { reply }).await
    }

    /// Halt playback and rewind the current verse; the index is kept.
    pub async fn stop(&self) -> Result<()> {
        self.request(|reply| Command::Stop { reply }).await
    }

    /// Move to the next verse. At the last verse this reloads the current one.
    pub async fn next_ayah(&self) -> Result<()> {
        self.request(|reply| Command::NextAyah { reply }).await
    }

    /// Move to the previous verse. At the first verse this reloads it.
    pub async fn previous_ayah(&self) -> Result<()> {
        self.request(|reply| Command::PreviousAyah { reply })
            .await
    }

    /// Seek back by the configured step.
    pub async fn rewind(&self) -> Result<()> {
        self.request(|reply| Command::Rewind { reply }).await
    }

    /// Seek forward by the configured step.
    pub async fn forward(&self) -> Result<()> {
        self.request(|reply| Command::Forward { reply }).await
    }

    /// Seek to `seconds` into the current verse, clamped to its duration.
    pub async fn seek(&self, seconds: f64) -> Result<()> {
        let position = time::secs_f64(seconds);
        self.request(|reply| Command::Seek { position, reply })
            .await
    }

    /// Jump to `index` and load it. Out-of-range indices change nothing.
    pub async fn skip_to_ayah(&self, index: usize) -> Result<()> {
        self.request(|reply| Command::SkipToAyah { index, reply })
            .await
    }

    /// Restart the current verse from the beginning.
    pub async fn repeat_current(&self) -> Result<()> {
        self.request(|reply| Command::RepeatCurrent { reply })
            .await
    }

    /// Restart the session from the first verse.
    ///
    /// Only acts when auto-repeat is enabled and the last verse is active;
    /// returns whether the session was restarted.
    pub async fn repeat_session(&self) -> Result<bool> {
        self.request(|reply| Command::RepeatSession { reply })
            .await
    }

    /// Change the inter-verse pause for every pause scheduled from now on.
    pub async fn set_pause_duration(&self, secs: u32) -> Result<()> {
        self.request(|reply| Command::SetPauseDuration { secs, reply })
            .await
    }

    pub async fn set_auto_repeat(&self, enabled: bool) -> Result<()> {
        self.request(|reply| Command::SetAutoRepeat { enabled, reply })
            .await
    }

    /// Latest published state, with the session time read live.
    pub fn snapshot(&self) -> PlayerSnapshot {
        let mut snapshot = self.snapshots.borrow().clone();
        snapshot.session_elapsed_secs = self.session_clock.elapsed();
        snapshot
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<PlayerSnapshot>
    where
        F: FnMut(&PlayerSnapshot) -> bool,
    {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map(|snapshot| PlayerSnapshot::clone(&snapshot))
            .map_err(|_| PlaybackError::ControllerClosed)?;
        Ok(snapshot)
    }

    /// Cancel timers, release the media element and stop the controller task.
    ///
    /// Subsequent operations fail with [`PlaybackError::ControllerClosed`].
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                warn!(error = %err, "Playback controller task ended abnormally");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("closed", &self.is_closed())
            .field("snapshot", &*self.snapshots.borrow())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`PlaybackController`].
pub struct ControllerBuilder {
    media: Arc<dyn MediaElement>,
    config: PlayerConfig,
    clock: Arc<dyn Clock>,
    listener: Arc<dyn PlaybackListener>,
    resolver: Option<Arc<dyn AudioResolver>>,
}

impl ControllerBuilder {
    fn new(media: Arc<dyn MediaElement>) -> Self {
        Self {
            media,
            config: PlayerConfig::default(),
            clock: Arc::new(SystemClock),
            listener: Arc::new(NoopListener),
            resolver: None,
        }
    }

    pub fn config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Wall clock for session timing. Default: system time.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn listener(mut self, listener: Arc<dyn PlaybackListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Override URL resolution. Default: [`AudioResourceResolver`] over the
    /// config's `resolver` section.
    pub fn resolver(mut self, resolver: Arc<dyn AudioResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Validate the configuration and spawn the controller task.
    ///
    /// Must be called from within the async runtime.
    pub fn spawn(self) -> Result<PlaybackController> {
        self.config.validate()?;

        let resolver = self.resolver.unwrap_or_else(|| {
            Arc::new(AudioResourceResolver::new(self.config.resolver.clone()))
        });
        let media = MediaSource::new(
            self.media,
            self.config.load_timeout,
            self.config.default_volume,
        );
        let session_clock = Arc::new(SessionClock::new(self.clock));

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let media_events = media.subscribe();
        let (snapshot_tx, snapshot_rx) = watch::channel(PlayerSnapshot::default());

        let actor = ControllerActor {
            sequence: Vec::new(),
            state: PlaybackState::default(),
            pause_duration: self.config.pause_duration,
            auto_repeat: self.config.auto_repeat,
            seek_step: self.config.seek_step,
            media,
            resolver,
            listener: self.listener,
            session_clock: Arc::clone(&session_clock),
            load_token: 0,
            pending_load: None,
            transport_generation: 0,
            pending_play: None,
            pause_timer: None,
            completed: BTreeSet::new(),
            completions: completion_tx,
            snapshots: snapshot_tx,
            last_phase: PlayerPhase::Idle,
        };
        actor.snapshots.send_replace(actor.build_snapshot());

        let shutdown = CancellationToken::new();
        let task = core_async::spawn(actor.run(
            command_rx,
            completion_rx,
            media_events,
            shutdown.clone(),
        ));

        Ok(PlaybackController {
            commands: command_tx,
            snapshots: snapshot_rx,
            session_clock,
            shutdown,
            task: Arc::new(Mutex::new(Some(task))),
        })
    }
}

// ============================================================================
// Actor
// ============================================================================

#[derive(Debug, Default)]
struct PlaybackState {
    current_index: usize,
    is_playing: bool,
    is_paused: bool,
    is_loading: bool,
    current_time: f64,
    duration: f64,
    error: Option<String>,
    session_completed: bool,
}

struct PendingLoad {
    token: u64,
    index: usize,
    candidates: Vec<AudioCandidate>,
    attempt: usize,
    autoplay: bool,
    waiters: Vec<Reply<()>>,
}

struct PendingPlay {
    generation: u64,
    reply: Option<Reply<()>>,
}

struct ControllerActor {
    sequence: Vec<Verse>,
    state: PlaybackState,
    pause_duration: u32,
    auto_repeat: bool,
    seek_step: Duration,
    media: MediaSource,
    resolver: Arc<dyn AudioResolver>,
    listener: Arc<dyn PlaybackListener>,
    session_clock: Arc<SessionClock>,
    load_token: u64,
    pending_load: Option<PendingLoad>,
    transport_generation: u64,
    pending_play: Option<PendingPlay>,
    pause_timer: Option<Pin<Box<Sleep>>>,
    /// Indices whose audio played through at least once this session.
    completed: BTreeSet<usize>,
    completions: mpsc::UnboundedSender<Completion>,
    snapshots: watch::Sender<PlayerSnapshot>,
    last_phase: PlayerPhase,
}

async fn pause_elapsed(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer.as_mut() {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

impl ControllerActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
        mut media_events: broadcast::Receiver<MediaEvent>,
        shutdown: CancellationToken,
    ) {
        let mut media_open = true;
        debug!("Playback controller started");

        loop {
            let input = core_async::select! {
                biased;
                _ = shutdown.cancelled() => Input::Shutdown,
                Some(done) = completions.recv() => Input::Completion(done),
                event = media_events.recv(), if media_open => match event {
                    Ok(event) => Input::Media(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Media notifications lagged");
                        Input::Idle
                    }
                    Err(RecvError::Closed) => {
                        media_open = false;
                        Input::Idle
                    }
                },
                _ = pause_elapsed(&mut self.pause_timer) => Input::PauseElapsed,
                command = commands.recv() => match command {
                    Some(command) => Input::Command(command),
                    None => Input::Shutdown,
                },
            };

            match input {
                Input::Shutdown => {
                    self.teardown();
                    self.publish();
                    break;
                }
                Input::Command(command) => self.handle_command(command),
                Input::Completion(Completion::Load {
                    token,
                    attempt,
                    result,
                }) => self.on_load_finished(token, attempt, result),
                Input::Completion(Completion::Play { generation, result }) => {
                    self.on_play_finished(generation, result)
                }
                Input::Media(event) => self.on_media_event(event),
                Input::PauseElapsed => self.on_pause_elapsed(),
                Input::Idle => {}
            }

            self.publish();
        }

        debug!("Playback controller stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetSequence { verses, reply } => {
                self.set_sequence(verses);
                let _ = reply.send(Ok(()));
            }
            Command::LoadVerse { index, reply } => {
                if let Err(err) = self.check_index(index) {
                    self.respond(reply, Err(err));
                    return;
                }
                self.set_index(index);
                let resume = self.is_running();
                self.load_verse(index, resume, Some(reply));
            }
            Command::Play { reply } => self.play(reply),
            Command::Pause { reply } => {
                self.pause();
                let _ = reply.send(Ok(()));
            }
            Command::Stop { reply } => {
                self.stop();
                let _ = reply.send(Ok(()));
            }
            Command::NextAyah { reply } => {
                let result = self.step(1);
                self.respond(reply, result);
            }
            Command::PreviousAyah { reply } => {
                let result = self.step(-1);
                self.respond(reply, result);
            }
            Command::Rewind { reply } => {
                let position = self.media.position().saturating_sub(self.seek_step);
                self.seek(position);
                let _ = reply.send(Ok(()));
            }
            Command::Forward { reply } => {
                let position = self.media.position().saturating_add(self.seek_step);
                self.seek(position);
                let _ = reply.send(Ok(()));
            }
            Command::Seek { position, reply } => {
                self.seek(position);
                let _ = reply.send(Ok(()));
            }
            Command::SkipToAyah { index, reply } => {
                let result = self.skip_to(index);
                self.respond(reply, result);
            }
            Command::RepeatCurrent { reply } => {
                if self.state.is_paused {
                    self.cancel_pause_timer();
                    self.state.is_paused = false;
                }
                if self.media.is_loaded() && !self.state.is_loading {
                    self.seek(Duration::ZERO);
                }
                self.play(reply);
            }
            Command::RepeatSession { reply } => {
                let result = Ok(self.repeat_session());
                self.respond(reply, result);
            }
            Command::SetPauseDuration { secs, reply } => {
                let result = validate_pause_duration(secs).map(|()| {
                    debug!(secs, "Inter-verse pause updated");
                    self.pause_duration = secs;
                });
                self.respond(reply, result);
            }
            Command::SetAutoRepeat { enabled, reply } => {
                self.auto_repeat = enabled;
                let _ = reply.send(Ok(()));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    fn set_sequence(&mut self, verses: Vec<Verse>) {
        self.cancel_pause_timer();
        self.abandon_play(PlaybackError::Superseded);
        self.abandon_load(PlaybackError::Superseded);
        self.media.pause();
        self.media.detach();

        self.state = PlaybackState::default();
        self.sequence = verses;
        self.completed.clear();

        let Some(first) = self.sequence.first() else {
            self.session_clock.reset();
            debug!("Empty verse sequence supplied");
            return;
        };

        let surah_id = first.surah_id;
        let verse_count = self.sequence.len();
        self.session_clock.start();
        info!(surah_id, verse_count, "Recitation session started");
        self.listener.on_session_started(surah_id, verse_count);

        self.load_verse(0, false, None);
    }

    fn play(&mut self, reply: Reply<()>) {
        if self.sequence.is_empty() {
            self.respond(reply, Err(PlaybackError::EmptySequence));
            return;
        }

        if self.state.is_loading {
            self.respond(reply, Err(PlaybackError::StillLoading));
            return;
        }

        // Playing during the silence between verses ends it early.
        if self.state.is_paused {
            let _ = reply.send(Ok(()));
            self.advance_after_pause();
            return;
        }

        if !self.media.is_loaded() {
            debug!(index = self.state.current_index, "Play requested with nothing loaded");
            let index = self.state.current_index;
            self.load_verse(index, false, None);
            self.respond(reply, Err(PlaybackError::NoAudioLoaded));
            return;
        }

        self.start_play(Some(reply));
    }

    fn start_play(&mut self, reply: Option<Reply<()>>) {
        self.cancel_pause_timer();
        self.state.is_paused = false;
        self.state.error = None;
        self.abandon_play(PlaybackError::Superseded);

        let generation = self.transport_generation;
        self.pending_play = Some(PendingPlay { generation, reply });

        let media = self.media.clone();
        let completions = self.completions.clone();
        core_async::spawn(async move {
            let result = media.play().await;
            let _ = completions.send(Completion::Play { generation, result });
        });
    }

    fn pause(&mut self) {
        self.cancel_pause_timer();
        self.abandon_play(PlaybackError::Superseded);
        if let Some(pending) = self.pending_load.as_mut() {
            pending.autoplay = false;
        }
        self.media.pause();
        self.state.is_playing = false;
        self.state.is_paused = false;
    }

    fn stop(&mut self) {
        self.pause();
        if self.media.is_loaded() {
            self.media.seek(Duration::ZERO);
        }
        self.state.current_time = 0.0;
        debug!(index = self.state.current_index, "Playback stopped");
    }

    /// Manual navigation by `delta` verses, clamped to the sequence.
    fn step(&mut self, delta: isize) -> Result<()> {
        if self.sequence.is_empty() {
            return Err(PlaybackError::EmptySequence);
        }

        let last = self.sequence.len() - 1;
        let target = self
            .state
            .current_index
            .saturating_add_signed(delta)
            .min(last);
        let resume = self.is_running();

        self.media.pause();
        self.set_index(target);
        self.load_verse(target, resume, None);
        Ok(())
    }

    fn skip_to(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;

        let resume = self.is_running();
        self.media.pause();
        self.set_index(index);
        self.load_verse(index, resume, None);
        Ok(())
    }

    fn seek(&mut self, position: Duration) {
        if !self.media.is_loaded() || self.state.is_loading {
            return;
        }
        let applied = self.media.seek(position);
        self.state.current_time = applied.as_secs_f64();
    }

    fn repeat_session(&mut self) -> bool {
        let Some(last) = self.sequence.len().checked_sub(1) else {
            return false;
        };
        if !self.auto_repeat || self.state.current_index != last {
            return false;
        }

        info!("Repeating session from the first verse");
        self.state.session_completed = false;
        self.completed.clear();
        self.set_index(0);
        self.load_verse(0, true, None);
        true
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Start loading the verse at `index`, superseding any load in flight.
    ///
    /// `index` must already be valid for the active sequence.
    fn load_verse(&mut self, index: usize, autoplay: bool, reply: Option<Reply<()>>) {
        let Some(verse) = self.sequence.get(index) else {
            if let Some(reply) = reply {
                let len = self.sequence.len();
                self.respond(reply, Err(PlaybackError::IndexOutOfBounds { index, len }));
            }
            return;
        };
        let (surah_id, verse_number) = (verse.surah_id, verse.number);

        self.cancel_pause_timer();
        self.abandon_play(PlaybackError::Superseded);
        self.abandon_load(PlaybackError::Superseded);
        self.media.detach();

        let mut candidates = self.resolver.resolve(surah_id, verse_number);
        candidates.truncate(MAX_LOAD_ATTEMPTS);

        self.state.is_loading = true;
        self.state.is_playing = false;
        self.state.is_paused = false;
        self.state.current_time = 0.0;
        self.state.duration = 0.0;
        self.state.error = None;

        self.load_token += 1;
        let token = self.load_token;

        let Some(first) = candidates.first() else {
            self.state.is_loading = false;
            let err = PlaybackError::AudioUnavailable {
                surah_id,
                verse_number,
            };
            error!(surah_id, verse = verse_number, "No audio candidates for verse");
            self.record(&err);
            if let Some(reply) = reply {
                let _ = reply.send(Err(err));
            }
            return;
        };

        debug!(
            index,
            surah_id,
            verse = verse_number,
            token,
            url = %strip_url(&first.url),
            "Loading verse audio"
        );
        self.spawn_load_attempt(token, 0, first.url.clone());

        self.pending_load = Some(PendingLoad {
            token,
            index,
            candidates,
            attempt: 0,
            autoplay,
            waiters: reply.into_iter().collect(),
        });
    }

    fn spawn_load_attempt(&self, token: u64, attempt: usize, url: String) {
        let media = self.media.clone();
        let completions = self.completions.clone();
        core_async::spawn(async move {
            let result = media.load(&url).await;
            let _ = completions.send(Completion::Load {
                token,
                attempt,
                result,
            });
        });
    }

    fn on_load_finished(&mut self, token: u64, attempt: usize, result: Result<MediaReady>) {
        let is_current = self
            .pending_load
            .as_ref()
            .is_some_and(|pending| pending.token == token && pending.attempt == attempt);
        if !is_current {
            debug!(token, attempt, "Discarding stale load result");
            return;
        }

        match result {
            Ok(ready) => {
                let Some(pending) = self.pending_load.take() else {
                    return;
                };
                let candidate = &pending.candidates[pending.attempt];
                self.media.attach(&candidate.url, ready.duration);

                self.state.is_loading = false;
                self.state.duration = ready.duration.as_secs_f64();
                self.state.current_time = 0.0;
                self.state.error = None;

                info!(
                    index = pending.index,
                    reciter = %candidate.reciter,
                    attempt = pending.attempt + 1,
                    "Verse audio ready"
                );

                for waiter in pending.waiters {
                    let _ = waiter.send(Ok(()));
                }
                if pending.autoplay {
                    self.start_play(None);
                }
            }
            Err(err) => self.on_candidate_failed(err),
        }
    }

    fn on_candidate_failed(&mut self, err: PlaybackError) {
        let Some(pending) = self.pending_load.as_mut() else {
            return;
        };

        let next = pending.attempt + 1;
        if let Some(candidate) = pending.candidates.get(next) {
            warn!(
                index = pending.index,
                token = pending.token,
                error = %err,
                fallback = %candidate.reciter,
                "Audio candidate failed, trying alternative"
            );
            pending.attempt = next;
            let (token, url) = (pending.token, candidate.url.clone());
            self.spawn_load_attempt(token, next, url);
            return;
        }

        let Some(pending) = self.pending_load.take() else {
            return;
        };
        let (surah_id, verse_number) = self
            .sequence
            .get(pending.index)
            .map(|verse| (verse.surah_id, verse.number))
            .unwrap_or_default();
        let failure = PlaybackError::AudioUnavailable {
            surah_id,
            verse_number,
        };

        error!(
            index = pending.index,
            surah_id,
            verse = verse_number,
            last_error = %err,
            "All audio candidates failed"
        );

        self.state.is_loading = false;
        self.record(&failure);
        self.listener
            .on_load_failed(pending.index, &failure.user_message());
        for waiter in pending.waiters {
            let _ = waiter.send(Err(failure.clone()));
        }
    }

    fn on_play_finished(&mut self, generation: u64, result: Result<()>) {
        let is_current = self
            .pending_play
            .as_ref()
            .is_some_and(|pending| pending.generation == generation);
        if !is_current {
            // A play that resolved after the user moved on must not leave audio running.
            if result.is_ok() && self.pending_play.is_none() && !self.state.is_playing {
                self.media.pause();
            }
            debug!(generation, "Discarding stale play result");
            return;
        }

        let Some(pending) = self.pending_play.take() else {
            return;
        };

        match &result {
            Ok(()) => {
                self.state.is_playing = true;
                self.state.is_paused = false;
                self.state.error = None;
                debug!(index = self.state.current_index, "Playback started");
            }
            Err(err) => {
                warn!(index = self.state.current_index, error = %err, "Playback start rejected");
                self.record(err);
            }
        }

        if let Some(reply) = pending.reply {
            let _ = reply.send(result);
        }
    }

    // ------------------------------------------------------------------------
    // Media notifications and the pause timer
    // ------------------------------------------------------------------------

    fn on_media_event(&mut self, event: MediaEvent) {
        let active = self.media.is_loaded() && !self.state.is_loading;
        match event {
            MediaEvent::TimeUpdate { position } if active => {
                self.state.current_time = position.as_secs_f64();
            }
            MediaEvent::MetadataLoaded { duration } if active => {
                self.media.set_duration(duration);
                self.state.duration = duration.as_secs_f64();
            }
            MediaEvent::Ended if active && self.state.is_playing => self.on_ended(),
            other => debug!(event = ?other, "Ignoring media notification"),
        }
    }

    fn on_ended(&mut self) {
        let Some(last) = self.sequence.len().checked_sub(1) else {
            return;
        };

        self.state.is_playing = false;
        self.pending_play = None;
        self.completed.insert(self.state.current_index);

        let index = self.state.current_index;
        if index < last {
            let upcoming = index + 1;
            self.state.is_paused = true;
            self.notify_verse_changed(upcoming);
            self.listener
                .on_inter_verse_pause(upcoming, self.pause_duration);

            debug!(upcoming, pause_secs = self.pause_duration, "Inter-verse pause started");
            self.pause_timer = Some(Box::pin(time::sleep(Duration::from_secs(u64::from(
                self.pause_duration,
            )))));
        } else if !self.state.session_completed {
            self.state.session_completed = true;
            let summary = self.summary();
            info!(
                surah_id = summary.surah_id,
                verses = summary.verses_completed,
                elapsed_secs = summary.elapsed_secs,
                "Recitation session completed"
            );
            self.listener.on_session_complete(&summary);
        }
    }

    fn on_pause_elapsed(&mut self) {
        self.pause_timer = None;
        if self.state.is_paused {
            self.advance_after_pause();
        }
    }

    fn advance_after_pause(&mut self) {
        self.cancel_pause_timer();

        // Derive the target from current state, not from when the pause began.
        let next = self.state.current_index + 1;
        if next >= self.sequence.len() {
            self.state.is_paused = false;
            return;
        }

        self.state.current_index = next;
        self.load_verse(next, true, None);
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn is_running(&self) -> bool {
        self.state.is_playing || self.state.is_paused
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.sequence.len() {
            Ok(())
        } else {
            Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.sequence.len(),
            })
        }
    }

    fn set_index(&mut self, index: usize) {
        if self.state.current_index == index {
            return;
        }
        // The inter-verse pause already announced the verse that follows.
        let announced = self.state.is_paused && index == self.state.current_index + 1;
        self.state.current_index = index;
        if !announced {
            self.notify_verse_changed(index);
        }
    }

    fn notify_verse_changed(&self, index: usize) {
        if let Some(verse) = self.sequence.get(index) {
            info!(index, surah_id = verse.surah_id, verse = verse.number, "Active verse changed");
            self.listener.on_verse_changed(index, verse);
        }
    }

    fn cancel_pause_timer(&mut self) {
        if self.pause_timer.take().is_some() {
            debug!("Inter-verse pause cancelled");
        }
    }

    /// Invalidate any play in flight; its eventual result will be discarded.
    fn abandon_play(&mut self, reason: PlaybackError) {
        self.transport_generation += 1;
        if let Some(PendingPlay {
            reply: Some(reply), ..
        }) = self.pending_play.take()
        {
            let _ = reply.send(Err(reason));
        }
    }

    /// Invalidate any load in flight; its eventual result will be discarded.
    fn abandon_load(&mut self, reason: PlaybackError) {
        if let Some(pending) = self.pending_load.take() {
            debug!(token = pending.token, index = pending.index, "Load superseded");
            for waiter in pending.waiters {
                let _ = waiter.send(Err(reason.clone()));
            }
        }
        self.state.is_loading = false;
    }

    fn respond<T>(&mut self, reply: Reply<T>, result: Result<T>) {
        if let Err(err) = &result {
            self.record(err);
        }
        let _ = reply.send(result);
    }

    /// Write a failure into the read-model unless it left state untouched.
    fn record(&mut self, err: &PlaybackError) {
        match err {
            PlaybackError::Superseded | PlaybackError::ControllerClosed => {}
            err if err.is_argument_error() => {}
            err => self.state.error = Some(err.user_message()),
        }
    }

    fn summary(&self) -> SessionSummary {
        let first = self.sequence.first();
        SessionSummary {
            surah_id: first.map(|verse| verse.surah_id).unwrap_or_default(),
            start_verse: first.map(|verse| verse.number).unwrap_or_default(),
            end_verse: self
                .sequence
                .last()
                .map(|verse| verse.number)
                .unwrap_or_default(),
            verses_completed: self.completed.len(),
            elapsed_secs: self.session_clock.elapsed(),
            pause_duration_secs: self.pause_duration,
            reciter: self.resolver.preferred_reciter().to_string(),
        }
    }

    fn teardown(&mut self) {
        self.cancel_pause_timer();
        self.abandon_play(PlaybackError::ControllerClosed);
        self.abandon_load(PlaybackError::ControllerClosed);
        self.media.release();
        self.state.is_playing = false;
        self.state.is_paused = false;
        self.state.current_time = 0.0;
        self.state.duration = 0.0;
    }

    fn build_snapshot(&self) -> PlayerSnapshot {
        let len = self.sequence.len();
        let index = self.state.current_index;
        PlayerSnapshot {
            is_playing: self.state.is_playing,
            is_paused: self.state.is_paused,
            is_loading: self.state.is_loading,
            current_time: self.state.current_time,
            duration: self.state.duration,
            progress_percent: view::progress_percent(self.state.current_time, self.state.duration),
            error: self.state.error.clone(),
            current_verse: self.sequence.get(index).cloned(),
            current_index: index,
            verse_count: len,
            session_completed: self.state.session_completed,
            completed_count: view::completed_count(index, len),
            remaining_count: view::remaining_count(index, len),
            session_elapsed_secs: self.session_clock.elapsed(),
            pause_duration_secs: self.pause_duration,
            auto_repeat: self.auto_repeat,
        }
    }

    fn publish(&mut self) {
        let snapshot = self.build_snapshot();
        let phase = snapshot.phase();
        if phase != self.last_phase {
            self.last_phase = phase;
            self.listener.on_phase_changed(phase);
        }
        self.snapshots.send_replace(snapshot);
    }
}
