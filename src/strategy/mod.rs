pub mod ma_crossover;
