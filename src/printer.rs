use image::GrayImage;
use log::{debug, info};
use tokio::sync::oneshot;

use crate::{
    canvas::Canvas,
    directive::{command_casette, command_print},
    error::Error,
    payload::Payload,
    status::PrintResult,
    utils::MonoImage,
};

/// GATT service advertised by the printer.
pub const SERVICE_UUID: &str = "be3dd650-2b3d-42f1-99c1-f0f749dd0678";

/// Characteristic the payload chunks are written to.
pub const PRINT_REQUEST_UUID: &str = "be3dd651-2b3d-42f1-99c1-f0f749dd0678";

/// Characteristic notifying the print result.
pub const PRINT_REPLY_UUID: &str = "be3dd652-2b3d-42f1-99c1-f0f749dd0678";

/// Callback receiving raw reply notifications.
pub type ReplyHandler = Box<dyn FnMut(&[u8]) + Send>;

/// Link to the printer.
///
/// Implement this for the Bluetooth stack in use. Writes go to
/// `PRINT_REQUEST_UUID` with response, notifications come from
/// `PRINT_REPLY_UUID`.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Handle of an active notification subscription. Dropping it must stop
    /// the delivery to the handler.
    type Subscription;

    async fn connect(&mut self) -> Result<(), Error>;

    async fn disconnect(&mut self) -> Result<(), Error>;

    /// Starts delivering reply notifications to `handler`, in order.
    async fn subscribe(&mut self, handler: ReplyHandler) -> Result<Self::Subscription, Error>;

    /// Writes a single chunk, resolves once the printer acknowledged it.
    async fn write(&mut self, chunk: &[u8]) -> Result<(), Error>;
}

/// Phase of a print session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connected,
    Sending,
    AwaitingReply,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplyState {
    WaitFirst,
    WaitSecond,
    Resolved,
}

// The printer notifies twice per job, first while printing and then with the
// result. Only the second one resolves the job.
struct ReplyTracker {
    state: ReplyState,
    sender: Option<oneshot::Sender<Result<PrintResult, Error>>>,
}

impl ReplyTracker {
    fn new(sender: oneshot::Sender<Result<PrintResult, Error>>) -> Self {
        ReplyTracker {
            state: ReplyState::WaitFirst,
            sender: Some(sender),
        }
    }

    fn receive(&mut self, data: &[u8]) {
        match self.state {
            ReplyState::WaitFirst => {
                debug!("Discarding first reply: {:X?}", data);
                self.state = ReplyState::WaitSecond;
            }
            ReplyState::WaitSecond => {
                debug!("Result reply: {:X?}", data);
                self.state = ReplyState::Resolved;
                if let Some(sender) = self.sender.take() {
                    // The receiver is gone if the caller gave up on the job.
                    sender.send(PrintResult::from_bytes(data)).ok();
                }
            }
            ReplyState::Resolved => {
                debug!("Ignoring reply after result: {:X?}", data);
            }
        }
    }
}

/// Print session over a `Transport`.
///
/// Jobs run one at a time. The caller owns any timeout policy: dropping the
/// future returned by `print` abandons the job and ends the notification
/// subscription.
pub struct Printer<T: Transport> {
    transport: T,
    state: SessionState,
}

impl<T: Transport> Printer<T> {
    pub fn new(transport: T) -> Self {
        Printer {
            transport,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn connect(&mut self) -> Result<(), Error> {
        if self.state != SessionState::Idle {
            return Ok(());
        }
        self.transport.connect().await?;
        self.transition(SessionState::Connected);
        Ok(())
    }

    pub async fn disconnect(&mut self) -> Result<(), Error> {
        if self.state == SessionState::Idle {
            return Ok(());
        }
        self.transport.disconnect().await?;
        self.transition(SessionState::Idle);
        Ok(())
    }

    /// Print a label and wait for the result reported by the printer.
    ///
    /// The reply subscription is registered before the first chunk is
    /// written and dropped on every exit path. If the returned future is
    /// dropped mid-job the session falls back to `Connected`.
    pub async fn print(&mut self, canvas: &Canvas) -> Result<PrintResult, Error> {
        if self.state == SessionState::Idle {
            return Err(Error::UnexpectedState(self.state));
        }
        debug!("Printing {:?}", canvas);
        let payload = command_print(canvas)?;

        let Printer { transport, state } = self;
        let mut state = JobGuard {
            state,
            finished: false,
        };

        let (sender, receiver) = oneshot::channel();
        let mut tracker = ReplyTracker::new(sender);
        let _subscription = transport
            .subscribe(Box::new(move |data: &[u8]| tracker.receive(data)))
            .await?;

        state.set(SessionState::Sending);
        send(transport, payload).await?;

        state.set(SessionState::AwaitingReply);
        let status = match receiver.await {
            Ok(result) => result?,
            Err(_) => return Err(Error::ReplyChannelClosed),
        };

        info!("Print result: {}", status);
        state.set(SessionState::Done);
        Ok(status)
    }

    /// Select the media type of the installed cassette.
    ///
    /// The printer doesn't reply to this command.
    pub async fn set_casette(&mut self, media_type: u8) -> Result<(), Error> {
        if self.state == SessionState::Idle {
            return Err(Error::UnexpectedState(self.state));
        }
        debug!("Setting cassette media type {}", media_type);
        send(&mut self.transport, command_casette(media_type)?).await
    }

    /// Apply `config` to `canvas` and print it.
    pub async fn print_with(
        &mut self,
        canvas: &Canvas,
        config: &Config,
    ) -> Result<PrintResult, Error> {
        let canvas = config.apply(canvas)?;
        if let Some(media_type) = config.media_type {
            self.set_casette(media_type).await?;
        }
        self.print(&canvas).await
    }

    fn transition(&mut self, state: SessionState) {
        transition(&mut self.state, state);
    }
}

async fn send<T: Transport>(transport: &mut T, payload: Payload) -> Result<(), Error> {
    for chunk in payload {
        transport.write(&chunk).await?;
    }
    Ok(())
}

fn transition(current: &mut SessionState, state: SessionState) {
    info!("Session state {:?} -> {:?}", current, state);
    *current = state;
}

// Session state of a running job. Unless the job got to `Done` the session
// is back to `Connected` once it is dropped, future dropped included.
struct JobGuard<'a> {
    state: &'a mut SessionState,
    finished: bool,
}

impl JobGuard<'_> {
    fn set(&mut self, state: SessionState) {
        self.finished = state == SessionState::Done;
        transition(self.state, state);
    }
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        if !self.finished && *self.state != SessionState::Connected {
            debug!("Job ended in {:?}", self.state);
            transition(self.state, SessionState::Connected);
        }
    }
}

/// Config
///
#[derive(Debug, Clone)]
pub struct Config {
    stretch: usize,
    padding: usize,
    reverse: bool,
    dither: bool,
    trim: bool,
    media_type: Option<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Initialize configuration data with default values.
    ///
    /// Labels are stretched 2 times by default like the vendor app does,
    /// otherwise the printed label is too thin to read.
    ///
    /// # Example
    ///
    /// ```
    /// use letratag::Config;
    ///
    /// let config = Config::new().stretch(3).padding(8).reverse(true);
    /// ```
    ///
    pub fn new() -> Config {
        Config {
            stretch: 2,
            padding: 0,
            reverse: false,
            dither: true,
            trim: false,
            media_type: None,
        }
    }

    pub fn stretch(self, factor: usize) -> Self {
        Config {
            stretch: factor,
            ..self
        }
    }

    /// Blank columns added on both sides of the label.
    pub fn padding(self, padding: usize) -> Self {
        Config { padding, ..self }
    }

    pub fn reverse(self, flag: bool) -> Self {
        Config {
            reverse: flag,
            ..self
        }
    }

    pub fn dither(self, flag: bool) -> Self {
        Config {
            dither: flag,
            ..self
        }
    }

    pub fn trim(self, flag: bool) -> Self {
        Config { trim: flag, ..self }
    }

    pub fn media_type(self, media_type: u8) -> Self {
        Config {
            media_type: Some(media_type),
            ..self
        }
    }

    /// Stretch, pad and then revert the canvas as configured.
    pub fn apply(&self, canvas: &Canvas) -> Result<Canvas, Error> {
        debug!("{:?}", self);
        let mut canvas = canvas.stretch(self.stretch)?;
        if self.padding != 0 {
            canvas = canvas.fill(self.padding, self.padding)?;
        }
        if self.reverse {
            canvas = canvas.revert();
        }
        Ok(canvas)
    }

    /// Convert a grayscale image into a canvas and apply the config to it.
    pub fn render(&self, image: &GrayImage) -> Result<Canvas, Error> {
        let bitmap = MonoImage::from_gray(image, self.dither);
        let canvas = Canvas::from_bitmap(&bitmap, self.trim)?;
        self.apply(&canvas)
    }
}
