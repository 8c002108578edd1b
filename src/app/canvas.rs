mod bubbles;
mod flow;
