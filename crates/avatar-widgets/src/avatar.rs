#![forbid(unsafe_code)]

//! Base avatar widget.
//!
//! Shows the first image source that loads, in priority order, and falls
//! back to a colored initial-letter placeholder when nothing resolves (or
//! when reduced-bandwidth mode is on).
//!
//! # Lifecycle
//!
//! - Props live on [`BaseAvatar`], which is cheap and rebuilt per render.
//! - Retry state lives on [`AvatarState`], one per widget instance.
//! - [`AvatarState::activate`] subscribes to a connectivity notifier so that
//!   a reconnection retries from the highest-priority source. The
//!   subscription is released by [`AvatarState::deactivate`] or when the
//!   state is dropped.
//!
//! # Events
//!
//! | Event | Effect |
//! |-------|--------|
//! | props change (url/urls) | rebuild candidates on next render, start over |
//! | [`AvatarEvent::SettingsChanged`] | rebuild candidates now if the flag differs, start over |
//! | [`AvatarEvent::LoadFailed`] | try the next candidate |
//! | connectivity reconnection | start over from the first candidate |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use avatar_core::{
    AvatarSettings, AvatarSources, ConnectivityNotifier, ConnectivitySubscription, Resolver,
    SyncListener, SyncTransition,
};
use avatar_style::{AvatarLogic, InlineStyle, placeholder_style, sized_style};

use crate::StatefulWidget;
use crate::view::{AvatarView, ClickHandler, ImageElement, Interaction, PlaceholderElement};

/// Default width and height in pixels.
pub const DEFAULT_SIZE: u32 = 40;
/// Default accessible label for clickable avatars.
pub const DEFAULT_ALT_TEXT: &str = "Avatar";

const CLASS_BASE: &str = "avatar";
const CLASS_IMAGE: &str = "avatar_image";
const CLASS_INITIAL: &str = "avatar_initial";

/// Legacy thumbnail resize hint.
///
/// Accepted for compatibility; it does not affect rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResizeMethod {
    #[default]
    Crop,
    Scale,
}

/// Events delivered to an avatar by its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarEvent {
    /// The image currently shown failed to load.
    LoadFailed,
    /// A connectivity transition observed outside the subscription.
    Connectivity(SyncTransition),
    /// Settings were changed by the host.
    SettingsChanged(AvatarSettings),
}

/// Retry state for one avatar instance.
pub struct AvatarState {
    settings: AvatarSettings,
    resolver: Rc<RefCell<Resolver>>,
    subscription: Option<ConnectivitySubscription>,
}

impl AvatarState {
    #[must_use]
    pub fn new(settings: AvatarSettings) -> Self {
        Self {
            settings,
            resolver: Rc::new(RefCell::new(Resolver::new(
                AvatarSources::default(),
                settings.reduced_bandwidth,
            ))),
            subscription: None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> AvatarSettings {
        self.settings
    }

    /// Subscribe to `notifier`; reconnections restart resolution.
    ///
    /// Any previous subscription is released first.
    pub fn activate(&mut self, notifier: Rc<dyn ConnectivityNotifier>) {
        self.deactivate();
        let resolver: Weak<RefCell<Resolver>> = Rc::downgrade(&self.resolver);
        let listener: SyncListener = Rc::new(move |transition: SyncTransition| {
            if let Some(resolver) = resolver.upgrade() {
                resolver.borrow_mut().on_sync_transition(transition);
            }
        });
        self.subscription = Some(ConnectivitySubscription::acquire(notifier, listener));
    }

    /// Release the connectivity subscription. Returns `false` if inactive.
    pub fn deactivate(&mut self) -> bool {
        self.subscription
            .take()
            .is_some_and(|mut subscription| subscription.release())
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(ConnectivitySubscription::is_active)
    }

    /// Apply a host event. Returns whether the displayed source may change.
    pub fn handle(&mut self, event: AvatarEvent) -> bool {
        match event {
            AvatarEvent::LoadFailed => {
                let mut resolver = self.resolver.borrow_mut();
                let before = resolver.cursor();
                resolver.on_load_failure();
                resolver.cursor() != before
            }
            AvatarEvent::Connectivity(transition) => {
                self.resolver.borrow_mut().on_sync_transition(transition)
            }
            AvatarEvent::SettingsChanged(settings) => {
                self.settings = settings;
                let mut resolver = self.resolver.borrow_mut();
                let sources = resolver.sources().clone();
                resolver.on_input_change(&sources, settings.reduced_bandwidth)
            }
        }
    }

    /// Source currently being attempted.
    #[must_use]
    pub fn resolved(&self) -> Option<String> {
        self.resolver.borrow().resolved().map(str::to_owned)
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.resolver.borrow().cursor()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.resolver.borrow().is_exhausted()
    }

    /// Candidates being tried, in order.
    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        self.resolver.borrow().candidates().as_slice().to_vec()
    }

    /// Reconcile props and settings; rebuilds only when something changed.
    fn sync_inputs(&mut self, url: Option<&str>, urls: Option<&[String]>) -> bool {
        let reduced_bandwidth = self.settings.reduced_bandwidth;
        let mut resolver = self.resolver.borrow_mut();
        let unchanged = resolver.sources().matches(url, urls)
            && resolver.reduced_bandwidth() == reduced_bandwidth;
        if unchanged {
            return false;
        }
        let sources = AvatarSources {
            primary: url.map(str::to_owned),
            fallbacks: urls.map(<[String]>::to_vec),
        };
        resolver.on_input_change(&sources, reduced_bandwidth)
    }
}

impl Default for AvatarState {
    fn default() -> Self {
        Self::new(AvatarSettings::default())
    }
}

impl fmt::Debug for AvatarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarState")
            .field("settings", &self.settings)
            .field("resolver", &self.resolver.borrow())
            .field("subscription", &self.subscription)
            .finish()
    }
}

/// Avatar props.
///
/// `name` keys the placeholder letter (and color unless `id_name` is set).
#[derive(Clone)]
pub struct BaseAvatar<'a> {
    name: &'a str,
    logic: &'a dyn AvatarLogic,
    id_name: Option<&'a str>,
    title: Option<&'a str>,
    url: Option<&'a str>,
    urls: Option<&'a [String]>,
    width: u32,
    height: u32,
    resize_method: ResizeMethod,
    default_to_initial_letter: bool,
    on_click: Option<ClickHandler>,
    alt_text: &'a str,
    class_name: Option<&'a str>,
    style: Option<&'a InlineStyle>,
}

impl<'a> BaseAvatar<'a> {
    /// Create an avatar for `name`, deriving placeholders through `logic`.
    #[must_use]
    pub fn new(name: &'a str, logic: &'a dyn AvatarLogic) -> Self {
        Self {
            name,
            logic,
            id_name: None,
            title: None,
            url: None,
            urls: None,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            resize_method: ResizeMethod::default(),
            default_to_initial_letter: true,
            on_click: None,
            alt_text: DEFAULT_ALT_TEXT,
            class_name: None,
            style: None,
        }
    }

    /// Identity key for the placeholder color, instead of the name. An empty
    /// id counts as unset.
    #[must_use]
    pub fn id_name(mut self, id_name: &'a str) -> Self {
        self.id_name = Some(id_name);
        self
    }

    /// Hover title.
    #[must_use]
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    /// Primary image URL.
    #[must_use]
    pub fn url(mut self, url: &'a str) -> Self {
        self.url = Some(url);
        self
    }

    /// Fallback image URLs, tried in order after the primary.
    #[must_use]
    pub fn urls(mut self, urls: &'a [String]) -> Self {
        self.urls = Some(urls);
        self
    }

    /// Size in pixels.
    #[must_use]
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn resize_method(mut self, method: ResizeMethod) -> Self {
        self.resize_method = method;
        self
    }

    /// Show the initial-letter placeholder when no image resolves.
    #[must_use]
    pub fn default_to_initial_letter(mut self, enabled: bool) -> Self {
        self.default_to_initial_letter = enabled;
        self
    }

    /// Make the avatar a button.
    #[must_use]
    pub fn on_click(mut self, handler: ClickHandler) -> Self {
        self.on_click = Some(handler);
        self
    }

    /// Accessible label used when the avatar is clickable.
    #[must_use]
    pub fn alt_text(mut self, alt_text: &'a str) -> Self {
        self.alt_text = alt_text;
        self
    }

    /// Extra class names, appended to the base class.
    #[must_use]
    pub fn class_name(mut self, class_name: &'a str) -> Self {
        self.class_name = Some(class_name);
        self
    }

    /// Style overrides, applied over the computed style.
    #[must_use]
    pub fn style(mut self, style: &'a InlineStyle) -> Self {
        self.style = Some(style);
        self
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The legacy resize hint as configured.
    #[must_use]
    pub fn resize_hint(&self) -> ResizeMethod {
        self.resize_method
    }

    fn classes(&self, variant: &str) -> String {
        let mut classes = format!("{CLASS_BASE} {variant}");
        if let Some(extra) = self.class_name.filter(|c| !c.trim().is_empty()) {
            classes.push(' ');
            classes.push_str(extra.trim());
        }
        classes
    }

    fn with_overrides(&self, computed: InlineStyle) -> InlineStyle {
        match self.style {
            Some(overrides) => computed.merged(overrides),
            None => computed,
        }
    }

    fn image(&self, src: String, interaction: Interaction) -> ImageElement {
        ImageElement {
            src,
            width: self.width,
            height: self.height,
            class_name: self.classes(CLASS_IMAGE),
            title: self.title.map(str::to_owned),
            style: self.with_overrides(sized_style(self.width, self.height)),
            interaction,
        }
    }

    fn placeholder(&self, interaction: Interaction) -> PlaceholderElement {
        let key = self.id_name.filter(|id| !id.is_empty()).unwrap_or(self.name);
        let background = self.logic.color_for(key);
        PlaceholderElement {
            letter: self.logic.initial_letter_for(self.name),
            background,
            width: self.width,
            height: self.height,
            class_name: self.classes(CLASS_INITIAL),
            title: self.title.map(str::to_owned),
            style: self.with_overrides(placeholder_style(self.width, self.height, background)),
            interaction,
        }
    }
}

impl StatefulWidget for BaseAvatar<'_> {
    type State = AvatarState;
    type Output = AvatarView;

    fn render(&self, state: &mut AvatarState) -> AvatarView {
        let render_span = avatar_core::debug_span!(
            "avatar.render",
            name = self.name,
            width = self.width,
            height = self.height
        );
        let _guard = render_span.enter();

        state.sync_inputs(self.url, self.urls);
        // Release the resolver before calling out to the host's logic.
        let resolved = state.resolved();
        let interaction = Interaction::from_handler(self.on_click.as_ref(), self.alt_text);

        match resolved {
            Some(src) => AvatarView::Image(self.image(src, interaction)),
            None if self.default_to_initial_letter => {
                AvatarView::Placeholder(self.placeholder(interaction))
            }
            None => AvatarView::Empty,
        }
    }
}

impl fmt::Debug for BaseAvatar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseAvatar")
            .field("name", &self.name)
            .field("id_name", &self.id_name)
            .field("title", &self.title)
            .field("url", &self.url)
            .field("urls", &self.urls)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("resize_method", &self.resize_method)
            .field("default_to_initial_letter", &self.default_to_initial_letter)
            .field("clickable", &self.on_click.is_some())
            .finish_non_exhaustive()
    }
}
