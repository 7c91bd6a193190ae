//! Route table: path to view fragment mapping.

/// The in-page routes of the site. Each route is backed by an HTML fragment
/// fetched on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Games,
    Movies,
    Proxy,
    Hacks,
    Chatbot,
    Chatroom,
    Loader,
    Settings,
}

impl Route {
    /// Parse a location path. Unknown paths map to nothing; callers fall
    /// back to [`Route::Home`].
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" | "/home" => Some(Self::Home),
            "/games" => Some(Self::Games),
            "/movies" => Some(Self::Movies),
            "/proxy" => Some(Self::Proxy),
            "/hacks" => Some(Self::Hacks),
            "/chatbot" => Some(Self::Chatbot),
            "/chatroom" => Some(Self::Chatroom),
            "/loader" => Some(Self::Loader),
            "/settings" => Some(Self::Settings),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_path(self) -> &'static str {
        match self {
            Self::Home => "/home",
            Self::Games => "/games",
            Self::Movies => "/movies",
            Self::Proxy => "/proxy",
            Self::Hacks => "/hacks",
            Self::Chatbot => "/chatbot",
            Self::Chatroom => "/chatroom",
            Self::Loader => "/loader",
            Self::Settings => "/settings",
        }
    }

    /// The fragment file backing this route.
    #[must_use]
    pub const fn view_file(self) -> &'static str {
        match self {
            Self::Home => "home.html",
            Self::Games => "games.html",
            Self::Movies => "movies.html",
            Self::Proxy => "proxy.html",
            Self::Hacks => "hacks.html",
            Self::Chatbot => "chatbot.html",
            Self::Chatroom => "chatroom.html",
            Self::Loader => "gameloader.html",
            Self::Settings => "settings.html",
        }
    }
}
