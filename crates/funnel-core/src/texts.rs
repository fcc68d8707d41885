//! User-facing copy, button labels and callback payloads.

pub const WELCOME_CAPTION: &str = "Привет! 👋\n\n\
Это бот нашего сообщества. Здесь мы простым языком разбираем криптовалюту, \
делимся идеями и отвечаем на вопросы участников.\n\n\
Нажми кнопку ниже, чтобы узнать больше или сразу попасть внутрь.";

pub const WHY_JOIN: &str = "Чтобы попасть в сообщество, подпишись на наш канал.\n\n\
Там выходят все разборы, анонсы эфиров и ссылки на закрытые материалы. \
После подписки нажми «Я подписался», и бот проверит её.";

pub const WHATS_INSIDE: &str = "Что внутри сообщества:\n\n\
• разборы рынка простым языком\n\
• подборки полезных инструментов\n\
• эфиры с ответами на вопросы\n\
• общение с участниками";

pub const SUBSCRIBED: &str = "Готово! ✅ Подписка подтверждена.\n\nДобро пожаловать в сообщество!";

pub const NOT_SUBSCRIBED: &str = "Похоже, подписки на канал пока нет. 🤔\n\n\
Подпишись по кнопке ниже и нажми «Я подписался» ещё раз.";

pub const BROADCAST_USAGE: &str = "Текст рассылки пуст. Формат: рассылка <текст>";

pub const BUTTON_WANT_IN: &str = "ХОЧУ ПОПАСТЬ";
pub const BUTTON_WHAT_IN: &str = "ЧТО ВНУТРИ СООБЩЕСТВА";
pub const BUTTON_SUBSCRIBE: &str = "Подписаться";
pub const BUTTON_I_SUBSCRIBED: &str = "Я подписался";

pub const CB_WANT_IN: &str = "want_in";
pub const CB_WHAT_IN: &str = "what_in";
pub const CB_I_SUBSCRIBE: &str = "i_subscribe";

/// Broadcast command keyword (lowercase).
pub const BROADCAST_KEYWORD: &str = "рассылка";

pub fn broadcast_done(delivered: usize) -> String {
    format!("Рассылка успешно разослана количеству пользователей: {delivered}")
}

pub fn report_started(mention: &str) -> String {
    format!("{mention} нажал /start")
}

pub fn report_subscribed(mention: &str) -> String {
    format!("{mention} подписался на канал")
}
