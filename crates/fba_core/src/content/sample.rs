//! Bundled placeholder content.
//!
//! Served by the read paths when no gateway is configured or a public read
//! fails, so the site always renders something.

use chrono::{TimeZone, Utc};

use super::rich_text::{Description, RichTextBlock};
use super::{AppItem, ExternalLink, MediaKind, MerchItem, Post, SiteInfo};

fn sample_timestamp(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
}

/// Placeholder posts for the feed section.
pub fn posts() -> Vec<Post> {
    vec![
        Post {
            id: "sample-post-1".to_string(),
            created_at: sample_timestamp(1),
            title: "SYSTEM ONLINE".to_string(),
            header_media_url: "https://placehold.co/600x600/E10600/FFFFFF?text=FBA:01".to_string(),
            header_media_type: MediaKind::Image,
            body_richtext: vec![
                RichTextBlock::heading(2, "SYSTEM ONLINE"),
                RichTextBlock::paragraph(
                    "Welcome to THE.SCRL. This is the primary feed. Connect a gateway and \
                     log in to begin posting your own content.",
                ),
            ],
            external_links: vec![ExternalLink {
                label: "View on X".to_string(),
                url: "https://x.com".to_string(),
            }],
            hidden: false,
            order_index: 1,
        },
        Post {
            id: "sample-post-2".to_string(),
            created_at: sample_timestamp(2),
            title: "TILE INFORMATION".to_string(),
            header_media_url: "https://placehold.co/600x600/000000/FFFFFF?text=FBA:02".to_string(),
            header_media_type: MediaKind::Image,
            body_richtext: vec![
                RichTextBlock::paragraph(
                    "Each tile opens to reveal more information. This one has a list.",
                ),
                RichTextBlock::list(vec![
                    "Item One".to_string(),
                    "Item Two".to_string(),
                    "Item Three".to_string(),
                ]),
            ],
            external_links: Vec::new(),
            hidden: false,
            order_index: 2,
        },
    ]
}

/// Placeholder merch items.
pub fn merch() -> Vec<MerchItem> {
    vec![MerchItem {
        id: "sample-merch-1".to_string(),
        created_at: sample_timestamp(1),
        name: "FBA Standard Issue Tee".to_string(),
        image_url: "https://placehold.co/600x800/000000/E10600?text=FBA+TEE".to_string(),
        image_urls: vec!["https://placehold.co/600x800/000000/E10600?text=FBA+TEE".to_string()],
        price_cents: 2999,
        currency: "USD".to_string(),
        description: Description::PlainText(
            "High quality cotton tee. Black with red logo. The official uniform.".to_string(),
        ),
        external_url: "#".to_string(),
        button_text: None,
        hidden: false,
        order_index: 1,
    }]
}

/// Placeholder app entries.
pub fn apps() -> Vec<AppItem> {
    vec![AppItem {
        id: "sample-app-1".to_string(),
        created_at: sample_timestamp(1),
        name: "Project Chimera".to_string(),
        icon_url: "https://placehold.co/128x128/E10600/000000?text=PC".to_string(),
        short_desc: "A sample application entry.".to_string(),
        body_richtext: vec![RichTextBlock::paragraph(
            "This is a description of Project Chimera. It does many amazing things.",
        )],
        links: vec![ExternalLink {
            label: "Learn More".to_string(),
            url: "#".to_string(),
        }],
        hidden: false,
        order_index: 1,
    }]
}

/// Placeholder info document.
pub fn site_info() -> SiteInfo {
    SiteInfo::new(vec![
        RichTextBlock::heading(1, "THE.INFO"),
        RichTextBlock::paragraph(
            "This is the main information hub. In disconnected mode, this content is \
             bundled with the site. Once you connect a gateway and log in, you can \
             manage this content from the database.",
        ),
        RichTextBlock::heading(2, "Link Hub"),
        RichTextBlock::list(vec![
            "Link A".to_string(),
            "Link B".to_string(),
            "Link C".to_string(),
        ]),
    ])
}
