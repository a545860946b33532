use crate::models::{PlayerResponse, StreamData, StreamFormat};

/// Pick the highest-bitrate audio format that carries a direct URL.
///
/// Formats without a bitrate rank as 0. On equal bitrate the earlier format wins.
pub fn select_best_audio(formats: &[StreamFormat]) -> Option<&StreamFormat> {
    formats
        .iter()
        .filter(|f| is_playable_audio(f))
        .fold(None, |best: Option<&StreamFormat>, candidate| match best {
            Some(current) if bitrate(current) >= bitrate(candidate) => Some(current),
            _ => Some(candidate),
        })
}

fn is_playable_audio(format: &StreamFormat) -> bool {
    let is_audio = format
        .mime_type
        .as_deref()
        .is_some_and(|m| m.starts_with("audio/"));
    let has_url = format.url.as_deref().is_some_and(|u| !u.is_empty());

    is_audio && has_url
}

fn bitrate(format: &StreamFormat) -> u32 {
    format.bitrate.unwrap_or(0)
}

impl StreamData {
    /// Combine video details with the best audio format of a player response.
    pub fn from_player(response: &PlayerResponse) -> Self {
        let details = response.video_details.as_ref();
        let best = response
            .streaming_data
            .as_ref()
            .and_then(|data| select_best_audio(&data.adaptive_formats));

        Self {
            url: best.and_then(|f| f.url.clone()),
            title: details.and_then(|d| d.title.clone()),
            author: details.and_then(|d| d.author.clone()),
            duration_seconds: details
                .and_then(|d| d.length_seconds.as_deref())
                .and_then(|secs| secs.trim().parse().ok()),
            bitrate: best.and_then(|f| f.bitrate),
            mime_type: best.and_then(|f| f.mime_type.clone()),
            itag: best.and_then(|f| f.itag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StreamingData, VideoDetails};

    fn format(mime: &str, bitrate: Option<u32>, url: &str, itag: u32) -> StreamFormat {
        StreamFormat {
            itag: Some(itag),
            url: Some(url.to_string()),
            mime_type: Some(mime.to_string()),
            bitrate,
        }
    }

    #[test]
    fn test_prefers_highest_audio_bitrate() {
        let formats = vec![
            format("audio/mp4; codecs=\"mp4a.40.2\"", Some(128), "https://a/140", 140),
            format("audio/webm; codecs=\"opus\"", Some(256), "https://a/251", 251),
            format("video/mp4; codecs=\"avc1\"", Some(1000), "https://v/137", 137),
        ];

        let best = select_best_audio(&formats).unwrap();
        assert_eq!(best.itag, Some(251));
    }

    #[test]
    fn test_no_audio_yields_none() {
        assert!(select_best_audio(&[]).is_none());

        let video_only = vec![
            format("video/mp4", Some(1000), "https://v/137", 137),
            format("video/webm", Some(900), "https://v/248", 248),
        ];
        assert!(select_best_audio(&video_only).is_none());
    }

    #[test]
    fn test_skips_formats_without_url() {
        let formats = vec![
            format("audio/webm", Some(256), "", 251),
            StreamFormat {
                itag: Some(250),
                url: None,
                mime_type: Some("audio/webm".to_string()),
                bitrate: Some(200),
            },
            format("audio/mp4", Some(128), "https://a/140", 140),
        ];

        assert_eq!(select_best_audio(&formats).unwrap().itag, Some(140));
    }

    #[test]
    fn test_tie_keeps_first_and_missing_bitrate_is_zero() {
        let formats = vec![
            format("audio/mp4", None, "https://a/139", 139),
            format("audio/mp4", Some(128), "https://a/140", 140),
            format("audio/webm", Some(128), "https://a/250", 250),
        ];
        assert_eq!(select_best_audio(&formats).unwrap().itag, Some(140));

        let unrated = vec![
            format("audio/mp4", None, "https://a/139", 139),
            format("audio/webm", None, "https://a/249", 249),
        ];
        assert_eq!(select_best_audio(&unrated).unwrap().itag, Some(139));
    }

    #[test]
    fn test_stream_data_from_player() {
        let response = PlayerResponse {
            video_details: Some(VideoDetails {
                video_id: Some("abc".to_string()),
                title: Some("Song".to_string()),
                author: Some("Artist".to_string()),
                length_seconds: Some("215".to_string()),
            }),
            streaming_data: Some(StreamingData {
                adaptive_formats: vec![format("audio/webm", Some(160), "https://a/251", 251)],
            }),
        };

        let data = StreamData::from_player(&response);
        assert_eq!(data.url.as_deref(), Some("https://a/251"));
        assert_eq!(data.title.as_deref(), Some("Song"));
        assert_eq!(data.duration_seconds, Some(215));
        assert_eq!(data.bitrate, Some(160));
        assert_eq!(data.itag, Some(251));
    }

    #[test]
    fn test_stream_data_without_formats_keeps_details() {
        let response = PlayerResponse {
            video_details: Some(VideoDetails {
                title: Some("Song".to_string()),
                length_seconds: Some("n/a".to_string()),
                ..Default::default()
            }),
            streaming_data: None,
        };

        let data = StreamData::from_player(&response);
        assert!(data.url.is_none());
        assert!(data.mime_type.is_none());
        assert_eq!(data.title.as_deref(), Some("Song"));
        assert!(data.duration_seconds.is_none());
    }
}
