// src/probes/platforms.rs

/// A profile URL pattern on one site. `{}` is replaced with the username.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub name: &'static str,
    pub template: &'static str,
    pub category: &'static str,
}

impl Platform {
    /// Profile URL for a username, percent-encoded for use in a URL
    pub fn profile_url(&self, username: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(username.as_bytes()).collect();
        self.template.replace("{}", &encoded)
    }
}

pub fn find(name: &str) -> Option<&'static Platform> {
    PLATFORMS.iter().find(|p| p.name == name)
}

pub static PLATFORMS: &[Platform] = &[
    Platform { name: "facebook", template: "https://www.facebook.com/{}", category: "Social Networks" },
    Platform { name: "twitter", template: "https://www.twitter.com/{}", category: "Social Networks" },
    Platform { name: "instagram", template: "https://www.instagram.com/{}", category: "Social Networks" },
    Platform { name: "tiktok", template: "https://www.tiktok.com/@{}", category: "Social Networks" },
    Platform { name: "snapchat", template: "https://www.snapchat.com/add/{}", category: "Social Networks" },
    Platform { name: "pinterest", template: "https://www.pinterest.com/{}", category: "Social Networks" },
    Platform { name: "linkedin", template: "https://www.linkedin.com/in/{}", category: "Social Networks" },
    Platform { name: "reddit", template: "https://www.reddit.com/user/{}", category: "Social Networks" },
    Platform { name: "youtube", template: "https://www.youtube.com/@{}", category: "Social Networks" },
    Platform { name: "twitch", template: "https://www.twitch.tv/{}", category: "Social Networks" },
    Platform { name: "telegram", template: "https://t.me/{}", category: "Messaging & Communication" },
    Platform { name: "discord", template: "https://discord.com/users/{}", category: "Messaging & Communication" },
    Platform { name: "whatsapp", template: "https://wa.me/{}", category: "Messaging & Communication" },
    Platform { name: "viber", template: "https://viber.click/{}", category: "Messaging & Communication" },
    Platform { name: "signal", template: "https://signal.me/#p/{}", category: "Messaging & Communication" },
    Platform { name: "flickr", template: "https://www.flickr.com/photos/{}", category: "Photo & Video" },
    Platform { name: "vimeo", template: "https://www.vimeo.com/{}", category: "Photo & Video" },
    Platform { name: "dailymotion", template: "https://www.dailymotion.com/{}", category: "Photo & Video" },
    Platform { name: "rumble", template: "https://rumble.com/{}", category: "Photo & Video" },
    Platform { name: "odysee", template: "https://odysee.com/@{}", category: "Photo & Video" },
    Platform { name: "medium", template: "https://medium.com/@{}", category: "Blogging & Content" },
    Platform { name: "hashnode", template: "https://hashnode.com/@{}", category: "Blogging & Content" },
    Platform { name: "wordpress", template: "https://{}.wordpress.com", category: "Blogging & Content" },
    Platform { name: "substack", template: "https://substack.com/@{}", category: "Blogging & Content" },
    Platform { name: "patreon", template: "https://www.patreon.com/{}", category: "Blogging & Content" },
    Platform { name: "steam", template: "https://steamcommunity.com/search/users/{}", category: "Gaming" },
    Platform { name: "xbox", template: "https://www.xbox.com/en-US/xbox-live/friends/search/{}", category: "Gaming" },
    Platform { name: "psn", template: "https://www.playstation.com/en-us/psn/{}", category: "Gaming" },
    Platform { name: "epicgames", template: "https://www.epicgames.com/site/en-US/home/{}", category: "Gaming" },
    Platform { name: "fortnite", template: "https://fortnite.gg/en/profile/{}", category: "Gaming" },
    Platform { name: "github", template: "https://www.github.com/{}", category: "Developer & Tech" },
    Platform { name: "gitlab", template: "https://www.gitlab.com/{}", category: "Developer & Tech" },
    Platform { name: "bitbucket", template: "https://www.bitbucket.org/{}", category: "Developer & Tech" },
    Platform { name: "stackoverflow", template: "https://stackoverflow.com/users/{}", category: "Developer & Tech" },
    Platform { name: "devto", template: "https://dev.to/{}", category: "Developer & Tech" },
    Platform { name: "tinder", template: "https://tinder.com/@{}", category: "Dating & Social" },
    Platform { name: "bumble", template: "https://bumble.com/{}", category: "Dating & Social" },
    Platform { name: "okcupid", template: "https://www.okcupid.com/profile/{}", category: "Dating & Social" },
    Platform { name: "hinge", template: "https://hinge.co/{}", category: "Dating & Social" },
    Platform { name: "meetup", template: "https://www.meetup.com/{}", category: "Dating & Social" },
    Platform { name: "ebay", template: "https://www.ebay.com/usr/{}", category: "Shopping & Marketplace" },
    Platform { name: "amazon", template: "https://www.amazon.com/s?k={}", category: "Shopping & Marketplace" },
    Platform { name: "etsy", template: "https://www.etsy.com/shop/{}", category: "Shopping & Marketplace" },
    Platform { name: "mercari", template: "https://www.mercari.com/u/{}", category: "Shopping & Marketplace" },
    Platform { name: "depop", template: "https://www.depop.com/{}", category: "Shopping & Marketplace" },
    Platform { name: "coinbase", template: "https://www.coinbase.com/{}", category: "Finance & Crypto" },
    Platform { name: "kraken", template: "https://www.kraken.com/{}", category: "Finance & Crypto" },
    Platform { name: "binance", template: "https://www.binance.com/{}", category: "Finance & Crypto" },
    Platform { name: "opensea", template: "https://opensea.io/{}", category: "Finance & Crypto" },
    Platform { name: "raydium", template: "https://raydium.io/fusion/{}", category: "Finance & Crypto" },
    Platform { name: "strava", template: "https://www.strava.com/athletes/{}", category: "Fitness & Health" },
    Platform { name: "myfitnesspal", template: "https://www.myfitnesspal.com/profile/{}", category: "Fitness & Health" },
    Platform { name: "fitbit", template: "https://www.fitbit.com/user/{}", category: "Fitness & Health" },
    Platform { name: "peloton", template: "https://www.peloton.com/profile/{}", category: "Fitness & Health" },
    Platform { name: "spotify", template: "https://open.spotify.com/user/{}", category: "Music & Podcasts" },
    Platform { name: "soundcloud", template: "https://soundcloud.com/{}", category: "Music & Podcasts" },
    Platform { name: "bandcamp", template: "https://{}.bandcamp.com", category: "Music & Podcasts" },
    Platform { name: "anchor", template: "https://anchor.fm/{}", category: "Music & Podcasts" },
    Platform { name: "apple_music", template: "https://music.apple.com/profile/{}", category: "Music & Podcasts" },
    Platform { name: "airbnb", template: "https://www.airbnb.com/users/show/{}", category: "Travel & Lifestyle" },
    Platform { name: "booking", template: "https://www.booking.com/profile.en.html?{}", category: "Travel & Lifestyle" },
    Platform { name: "tripadvisor", template: "https://www.tripadvisor.com/members/{}", category: "Travel & Lifestyle" },
    Platform { name: "foursquare", template: "https://foursquare.com/{}", category: "Travel & Lifestyle" },
    Platform { name: "indeed", template: "https://www.indeed.com/profile/{}", category: "Job & Networking" },
    Platform { name: "glassdoor", template: "https://www.glassdoor.com/Profile/profile.htm?{}", category: "Job & Networking" },
    Platform { name: "angellist", template: "https://angel.co/{}", category: "Job & Networking" },
    Platform { name: "producthunt", template: "https://www.producthunt.com/@{}", category: "Job & Networking" },
    Platform { name: "quora", template: "https://www.quora.com/profile/{}", category: "Community & Forums" },
    Platform { name: "nextdoor", template: "https://nextdoor.com/member/{}", category: "Community & Forums" },
    Platform { name: "ycombinator", template: "https://news.ycombinator.com/user?id={}", category: "Community & Forums" },
    Platform { name: "dribbble", template: "https://dribbble.com/{}", category: "Community & Forums" },
    Platform { name: "behance", template: "https://www.behance.net/{}", category: "Community & Forums" },
    Platform { name: "aol", template: "https://aim.aol.com/{}", category: "Additional Platforms" },
    Platform { name: "icq", template: "https://www.icq.com/{}", category: "Additional Platforms" },
    Platform { name: "skype", template: "https://web.skype.com/{}", category: "Additional Platforms" },
    Platform { name: "line", template: "https://line.me/R/ti/p/{}", category: "Additional Platforms" },
    Platform { name: "wechat", template: "https://weixin.qq.com/{}", category: "Additional Platforms" },
    Platform { name: "vk", template: "https://vk.com/{}", category: "Regional Networks" },
    Platform { name: "ok", template: "https://ok.ru/{}", category: "Regional Networks" },
    Platform { name: "weibo", template: "https://www.weibo.com/u/{}", category: "Regional Networks" },
    Platform { name: "qq", template: "https://qq.com/{}", category: "Regional Networks" },
];
