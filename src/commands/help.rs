use crate::utils::errors::AppError;
use crate::utils::Panel;

pub fn help_panel() -> Panel {
    Panel::new("📖 stockview Commands")
        .description("Price history charts with Monte Carlo simulation overlays.")
        .field(
            "📈 Charts",
            "chart <TICKER> [range] [start end] - Load a ticker\n\
             range <1m|3m|6m|1y|all|custom> [start end] - Change the range\n\
             mode <history|simulation> - Switch the view mode",
        )
        .field(
            "🎲 Simulation",
            "simulate [days=60] [trials=200] - Run a Monte Carlo simulation\n\
             stats - Show the simulation summary",
        )
        .field(
            "💹 Market",
            "quote [SYMBOL] - Real-time quote (5 per minute)\n\
             fundamentals [TICKER] - Company profile and statements\n\
             analyze <T1,T2,..> <start> <end> - Risk analysis",
        )
        .field(
            "💰 Account",
            "deposit <amount> - Add funds\n\
             withdraw <amount> - Withdraw funds\n\
             order <buy|sell> <TICKER> <qty> [limit_price] - Place an order",
        )
        .field("🤖 Assistant", "chat <message> - Ask the investment assistant")
        .footer("help - Show this message | quit - Exit")
}

pub fn execute() -> Result<(), AppError> {
    help_panel().print();
    Ok(())
}
