use {
    serenity::{
        all::{
            Client,
            Context,
            CreateAllowedMentions,
            CreateMessage,
            EventHandler,
            GatewayIntents,
            Message,
            Ready,
            User,
        },
        async_trait,
    },
    tokio::sync::Mutex,
    crate::{
        commands::{
            Author,
            Command,
            Invocation,
            Reply,
            State,
        },
        prelude::*,
    },
};

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: PlayerId::from(user.id.to_string()),
            name: user.name.clone(),
        }
    }
}

struct Handler {
    command_prefix: String,
    state: Arc<Mutex<State>>,
}

impl Handler {
    async fn send(&self, ctx: &Context, msg: &Message, Reply { messages, ping }: Reply) -> serenity::Result<()> {
        for content in messages {
            let mut builder = CreateMessage::new().content(content);
            if !ping {
                builder = builder.allowed_mentions(CreateAllowedMentions::new());
            }
            msg.channel_id.send_message(ctx, builder).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        log::info!("connected to Discord as {}", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return
        }
        let Some((command, args)) = Command::parse(&self.command_prefix, &msg.content) else { return };
        log::debug!("{command:?} from {} ({})", msg.author.name, msg.author.id);
        let invocation = Invocation {
            author: Author::from(&msg.author),
            mentions: msg.mentions.iter().map(Author::from).collect(),
            attachments: msg.attachments.iter().map(|attachment| attachment.url.clone()).collect(),
            args,
        };
        // the lock is held for the whole command so pairing never interleaves with point changes
        let reply = match self.state.lock().await.handle(command, invocation) {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("error handling {command:?} from {}: {e}", msg.author.id);
                Reply {
                    messages: vec![format!("⚠️ Something went wrong saving the league data. The change may not have been stored.")],
                    ping: false,
                }
            }
        };
        if let Err(e) = self.send(&ctx, &msg, reply).await {
            log::error!("failed to send reply to {command:?}: {e}");
        }
    }
}

pub(crate) async fn run(token: &str, command_prefix: String, state: State) -> serenity::Result<()> {
    let intents = GatewayIntents::GUILD_MESSAGES | GatewayIntents::DIRECT_MESSAGES | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(token, intents)
        .event_handler(Handler {
            command_prefix,
            state: Arc::new(Mutex::new(state)),
        })
        .await?;
    client.start().await
}
