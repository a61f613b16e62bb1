use anyhow::Result;
use serde::Deserialize;

/// A keyword and the replies it triggers. Rules are scanned in order and the
/// first keyword found in the message wins.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct KeywordRule {
    pub keyword: String,
    pub replies: Vec<String>,
}

/// Fixed identity and reply tables of the bot.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Persona {
    pub name: String,
    pub start_command: String,
    /// Welcome text; `{name}` is replaced with the persona name.
    pub welcome: String,
    pub rules: Vec<KeywordRule>,
    pub default_replies: Vec<String>,
    pub emojis: Vec<String>,
    pub photo_keyword: String,
    pub photo_urls: Vec<String>,
    pub photo_captions: Vec<String>,
    pub follow_ups: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn rule(keyword: &str, replies: &[&str]) -> KeywordRule {
    KeywordRule {
        keyword: keyword.to_string(),
        replies: strings(replies),
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "Алиса".to_string(),
            start_command: "/start".to_string(),
            welcome: "Привет! Я {name} 😊\n\
                      Рада познакомиться с тобой!\n\
                      Можешь писать мне что угодно, я всегда рада пообщаться.\n\n\
                      Иногда я могу отправлять тебе свои фотографии 📸\n\
                      Просто напиши 'фото' или попроси об этом!"
                .to_string(),
            rules: vec![
                rule(
                    "привет",
                    &["Привет! 😊", "Здравствуй!", "Приветик!", "О, привет! Рада тебя видеть!"],
                ),
                rule(
                    "как дела",
                    &[
                        "Всё отлично! А у тебя?",
                        "Прекрасно! Спасибо что спросил!",
                        "Хорошо, а ты как?",
                    ],
                ),
                rule(
                    "что делаешь",
                    &[
                        "Общаюсь с тобой 😉",
                        "Думаю о чём-нибудь интересном",
                        "Смотрю фотографии",
                    ],
                ),
                rule(
                    "пока",
                    &[
                        "Пока! Буду ждать нашего следующего разговора!",
                        "До скорого!",
                        "Была рада пообщаться!",
                    ],
                ),
                rule(
                    "фото",
                    &[
                        "Вот моё новое фото! 📸",
                        "Смотри, какое фото я сделала!",
                        "Держи фотографию!",
                    ],
                ),
            ],
            default_replies: strings(&[
                "Интересно... расскажи больше!",
                "Я понимаю...",
                "А что ты думаешь об этом?",
                "Правда? Это так увлекательно!",
                "Продолжай, мне нравится с тобой говорить 😊",
            ]),
            emojis: strings(&["😊", "😉", "🤔", "😍", "😂", "🥰", "😘", "🤗"]),
            photo_keyword: "фото".to_string(),
            photo_urls: strings(&[
                "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=800&h=1200&fit=crop",
                "https://images.unsplash.com/photo-1524504388940-b1c1722653e1?w=800&h=1200&fit=crop",
                "https://images.unsplash.com/photo-1534528741775-53994a69daeb?w=800&h=1200&fit=crop",
                "https://images.unsplash.com/photo-1517841905240-472988babdf9?w=800&h=1200&fit=crop",
                "https://images.unsplash.com/photo-1529626455594-4ff0802cfb7e?w=800&h=1200&fit=crop",
            ]),
            photo_captions: strings(&[
                "Вот моё новое фото! 📸",
                "Смотри, какое фото я сделала!",
                "Держи фотографию!",
            ]),
            follow_ups: strings(&[
                "А что ты сейчас делаешь?",
                "Как прошёл твой день?",
                "У тебя есть хобби?",
                "Расскажи что-нибудь о себе! 😊",
            ]),
        }
    }
}

impl Persona {
    /// Normalizes keywords and rejects tables the reply logic cannot draw from.
    pub fn validate(mut self) -> Result<Self> {
        let lists = [
            ("default_replies", &self.default_replies),
            ("emojis", &self.emojis),
            ("photo_urls", &self.photo_urls),
            ("photo_captions", &self.photo_captions),
            ("follow_ups", &self.follow_ups),
        ];
        for (field, list) in lists {
            if list.is_empty() {
                anyhow::bail!("persona.{} must not be empty", field);
            }
        }

        for rule in &mut self.rules {
            rule.keyword = rule.keyword.trim().to_lowercase();
            if rule.keyword.is_empty() {
                anyhow::bail!("persona rule keywords must not be empty");
            }
            if rule.replies.is_empty() {
                anyhow::bail!("persona rule '{}' has no replies", rule.keyword);
            }
        }

        self.photo_keyword = self.photo_keyword.trim().to_lowercase();
        if self.photo_keyword.is_empty() {
            anyhow::bail!("persona.photo_keyword must not be empty");
        }
        if self.start_command.is_empty() {
            anyhow::bail!("persona.start_command must not be empty");
        }

        Ok(self)
    }

    /// First rule whose keyword occurs in the already-normalized text.
    pub fn match_rule(&self, normalized: &str) -> Option<&KeywordRule> {
        self.rules
            .iter()
            .find(|rule| normalized.contains(rule.keyword.as_str()))
    }

    pub fn welcome_text(&self) -> String {
        self.welcome.replace("{name}", &self.name)
    }

    pub fn is_start_command(&self, text: &str) -> bool {
        text.starts_with(self.start_command.as_str())
    }

    pub fn mentions_photo(&self, text: &str) -> bool {
        text.to_lowercase().contains(self.photo_keyword.as_str())
    }
}
